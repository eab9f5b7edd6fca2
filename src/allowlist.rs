// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Elements and attributes that can survive sanitising.

Both lists are matched against local names, case-sensitively.
Anything that is not listed here is removed.
*/

/// Allowed element local names.
///
/// Must be sorted.
pub static ALLOWED_TAGS: &[&str] = &[
    "circle", "ellipse", "g", "line", "path", "polygon", "polyline", "rect",
    "style", "svg", "text", "tspan",
];

/// Allowed attribute local names.
///
/// Must be sorted.
pub static ALLOWED_ATTRIBUTES: &[&str] = &[
    "class", "cx", "cy", "d", "fill", "font-family", "font-size", "height",
    "id", "opacity", "preserveAspectRatio", "r", "stroke", "stroke-linecap",
    "stroke-linejoin", "stroke-width", "style", "text-anchor", "transform",
    "viewBox", "width", "x", "y",
];

/// Checks that an element with the specified local name is allowed.
#[inline]
pub fn is_allowed_tag(local: &str) -> bool {
    ALLOWED_TAGS.binary_search(&local).is_ok()
}

/// Checks that an attribute with the specified local name is allowed.
#[inline]
pub fn is_allowed_attribute(local: &str) -> bool {
    ALLOWED_ATTRIBUTES.binary_search(&local).is_ok()
}

/// Checks that the name belongs to the styling vocabulary,
/// which is controlled by [`Options::allow_style`](crate::Options::allow_style).
#[inline]
pub fn is_style(local: &str) -> bool {
    local == "style"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorted() {
        assert!(ALLOWED_TAGS.windows(2).all(|w| w[0] < w[1]));
        assert!(ALLOWED_ATTRIBUTES.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(ALLOWED_TAGS.len(), 12);
        assert_eq!(ALLOWED_ATTRIBUTES.len(), 23);
    }

    #[test]
    fn tags() {
        assert!(is_allowed_tag("svg"));
        assert!(is_allowed_tag("tspan"));
        assert!(is_allowed_tag("style"));
        assert!(!is_allowed_tag("script"));
        assert!(!is_allowed_tag("foreignObject"));
        assert!(!is_allowed_tag("image"));
        assert!(!is_allowed_tag("use"));
        assert!(!is_allowed_tag("a"));
        assert!(!is_allowed_tag("SVG"));
    }

    #[test]
    fn attributes() {
        assert!(is_allowed_attribute("d"));
        assert!(is_allowed_attribute("viewBox"));
        assert!(is_allowed_attribute("style"));
        assert!(!is_allowed_attribute("viewbox"));
        assert!(!is_allowed_attribute("onload"));
        assert!(!is_allowed_attribute("href"));
        assert!(!is_allowed_attribute("xmlns"));
    }
}
