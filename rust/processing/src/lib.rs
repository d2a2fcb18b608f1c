// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shellweld Processing
//!
//! Converts batches of elements in parallel. Every element gets its own
//! [`Kernel`](shellweld_geometry::Kernel), so welding state never crosses
//! elements, and a failing element is reported without stopping the rest.

pub mod config;
pub mod error;
pub mod pipeline;
pub mod types;

pub use config::PipelineConfig;
pub use error::{Error, Result};
pub use pipeline::{process_element, process_elements, process_elements_json};
pub use types::{Element, ElementResult, ProcessingResult, ProcessingStats};
