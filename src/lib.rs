//! Decoder for environmental sensor history carried in NFC tag URLs.
//!
//! A low-power encoder keeps a circular buffer of packed 12-bit temperature
//! and humidity readings inside the URL on its tag. This crate unwraps that
//! buffer, checks its HMAC-MD5 (or MD5) digest and returns timestamped
//! samples, newest first.
//!
//! ```no_run
//! use cupl_decoder::{decode_url, DecodeOptions};
//!
//! let url = "https://plotsensor.com/?t=DAA.&v=AAIB&x=AQAAAABk&q=...";
//! match decode_url("AAAACCCC11112222", url, &DecodeOptions::default(), None) {
//!     Ok(result) => {
//!         for sample in result.samples {
//!             println!("{} {:.2}", sample.timestamp, sample.temp);
//!         }
//!     }
//!     Err(e) => eprintln!("{}", e),
//! }
//! ```

pub mod buffer;
pub mod codec;
pub mod config;
pub mod decoder;
pub mod error;
pub mod formats;
pub mod models;
pub mod query;
pub mod timeline;
pub mod utils;

pub use codec::{Protocol, StatusLayout};
pub use config::{DecodeOptions, DecoderConfig};
pub use decoder::{decode, decode_params, decode_url, dispatch};
pub use error::{ConfigError, DecodeError};
pub use formats::CircFormat;
pub use models::{DecodeResult, HashType, Measurement, Pair, ResetCause, Sample, Status};
pub use query::UrlParams;
