#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod fixture;
mod mock;

pub use fixture::font_path;
pub use mock::{MockOpticalProvider, MockSpeechProvider, create_mock_services, sample_png};
