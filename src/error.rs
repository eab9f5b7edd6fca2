// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/// List of all errors.
///
/// Every error means that the input was rejected as a whole.
/// There is no partial output.
#[derive(Debug)]
pub enum Error {
    /// Only UTF-8 content are supported.
    ///
    /// A kind of malformed input, which can be produced only by the bytes-based API.
    NotAnUtf8Str,

    /// The input is not a well-formed XML.
    ///
    /// Documents with a DTD internal subset are rejected as well.
    MalformedInput(roxmltree::Error),

    /// The input is a well-formed XML, but the root element is not `svg`.
    InvalidRoot,
}

impl Error {
    /// Checks that the input was rejected because of an invalid XML.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Error::NotAnUtf8Str | Error::MalformedInput(_))
    }
}

impl From<roxmltree::Error> for Error {
    fn from(e: roxmltree::Error) -> Self {
        Error::MalformedInput(e)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            Error::NotAnUtf8Str => {
                write!(f, "provided data has not an UTF-8 encoding")
            }
            Error::MalformedInput(ref e) => {
                write!(f, "SVG data parsing failed cause {}", e)
            }
            Error::InvalidRoot => {
                write!(f, "the root element is not 'svg'")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self {
            Error::MalformedInput(ref e) => Some(e),
            _ => None,
        }
    }
}
