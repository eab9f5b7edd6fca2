// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
`safesvg` is an allowlist-based [SVG] sanitiser.

It takes an untrusted SVG document and produces a document that contains
only a small, fixed set of presentational elements and attributes.
Scripts, event handlers, foreign content, links and external references
are removed, because they are simply not on the allowlist.

## Processing

1. The input is parsed as XML. The DTD is never processed: a DOCTYPE
   with an internal subset is rejected, any other one is skipped.
   Malformed input and documents with a non-`svg` root element are rejected.
2. The tree is walked from the root element. Disallowed elements are removed
   together with their subtrees, disallowed attributes are removed as well.
3. Namespace declarations on the root element are normalized and
   the SVG namespace is added when missing.
4. The tree is written back to a string.

The output is deterministic and sanitising it once again doesn't change it.

## Example

```
let opt = safesvg::Options {
    indent_output: false,
    ..safesvg::Options::default()
};

let output = safesvg::sanitise(
    "<svg><path d='M0 0' onload='alert(1)'/><script>alert(2)</script></svg>",
    &opt,
);

assert_eq!(
    output.as_deref(),
    Some("<svg xmlns=\"http://www.w3.org/2000/svg\"><path d=\"M0 0\" /></svg>")
);
```

[SVG]: https://en.wikipedia.org/wiki/Scalable_Vector_Graphics
*/

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod allowlist;
mod error;
mod options;
mod sanitiser;
mod tree;
mod writer;

pub use crate::error::*;
pub use crate::options::*;
pub use crate::tree::*;

pub use roxmltree;

/// Sanitises an SVG string.
///
/// Returns `None` when the input is not a well-formed XML
/// or when its root element is not `svg`.
/// Use [`try_sanitise`] to get the reason.
pub fn sanitise(content: &str, opt: &Options) -> Option<String> {
    match try_sanitise(content, opt) {
        Ok(v) => Some(v),
        Err(e) => {
            log::warn!("SVG was rejected cause {}.", e);
            None
        }
    }
}

/// Sanitises an SVG string.
pub fn try_sanitise(content: &str, opt: &Options) -> Result<String, Error> {
    let content = content.strip_prefix('\u{FEFF}').unwrap_or(content);

    let mut doc = Document::parse_str(content, opt)?;
    doc.sanitise(opt);
    Ok(doc.to_string(opt))
}

/// Sanitises SVG data.
///
/// The data must be UTF-8 encoded. A byte order mark is allowed.
///
/// Returns `None` when [`try_sanitise_data`] fails.
pub fn sanitise_data(data: &[u8], opt: &Options) -> Option<String> {
    match try_sanitise_data(data, opt) {
        Ok(v) => Some(v),
        Err(e) => {
            log::warn!("SVG was rejected cause {}.", e);
            None
        }
    }
}

/// Sanitises SVG data.
pub fn try_sanitise_data(data: &[u8], opt: &Options) -> Result<String, Error> {
    let text = std::str::from_utf8(data).map_err(|_| Error::NotAnUtf8Str)?;
    try_sanitise(text, opt)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compact() -> Options {
        Options {
            indent_output: false,
            ..Options::default()
        }
    }

    #[test]
    fn bom_is_skipped() {
        let output = sanitise("\u{FEFF}<svg/>", &compact());
        assert_eq!(output.as_deref(), Some("<svg xmlns=\"http://www.w3.org/2000/svg\" />"));
    }

    #[test]
    fn bom_in_data_is_skipped() {
        let output = sanitise_data(b"\xEF\xBB\xBF<svg/>", &compact());
        assert_eq!(output.as_deref(), Some("<svg xmlns=\"http://www.w3.org/2000/svg\" />"));
    }

    #[test]
    fn invalid_utf8() {
        let err = try_sanitise_data(b"<svg>\xFF</svg>", &compact()).unwrap_err();
        assert!(matches!(err, Error::NotAnUtf8Str));
        assert!(err.is_malformed());
        assert_eq!(sanitise_data(b"<svg>\xFF</svg>", &compact()), None);
    }

    #[test]
    fn invalid_root() {
        let err = try_sanitise("<html/>", &compact()).unwrap_err();
        assert!(matches!(err, Error::InvalidRoot));
        assert!(!err.is_malformed());
    }

    #[test]
    fn malformed() {
        let err = try_sanitise("<svg><g></svg>", &compact()).unwrap_err();
        assert!(matches!(err, Error::MalformedInput(_)));
        assert!(err.is_malformed());
    }
}
