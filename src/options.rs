// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/// Sanitising options.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Options {
    /// Adds the `xmlns="http://www.w3.org/2000/svg"` declaration to the root element,
    /// unless it's already present.
    ///
    /// When disabled, the declaration is not added,
    /// but it's still preserved when present in the input.
    ///
    /// Default: true
    pub add_namespace: bool,

    /// Writes each node on a separate line, indented by two spaces.
    ///
    /// # Examples
    ///
    /// Enabled:
    ///
    /// ```text
    /// <svg xmlns="http://www.w3.org/2000/svg">
    ///   <rect fill="red" />
    /// </svg>
    /// ```
    ///
    /// Disabled:
    ///
    /// ```text
    /// <svg xmlns="http://www.w3.org/2000/svg"><rect fill="red" /></svg>
    /// ```
    ///
    /// Whitespace-only text nodes of the input are never preserved,
    /// so the output indentation doesn't depend on the input one.
    ///
    /// Default: true
    pub indent_output: bool,

    /// Removes XML comments.
    ///
    /// Default: false
    pub remove_comments: bool,

    /// Keeps `style` attributes and `style` elements.
    ///
    /// Their content is not validated in any way.
    ///
    /// Default: true
    pub allow_style: bool,
}

impl Options {
    /// Returns options for contexts demanding a stricter output.
    ///
    /// Same as default, but comments and styles are removed.
    pub fn cautious() -> Self {
        Options {
            add_namespace: true,
            indent_output: true,
            remove_comments: true,
            allow_style: false,
        }
    }
}

impl Default for Options {
    fn default() -> Self {
        Options {
            add_namespace: true,
            indent_output: true,
            remove_comments: false,
            allow_style: true,
        }
    }
}
