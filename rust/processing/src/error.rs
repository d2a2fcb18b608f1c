// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors that stop a whole batch. Element failures are not among them;
/// they end up in [`ElementResult::error`](crate::ElementResult::error).
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid element JSON: {0}")]
    Json(#[from] serde_json::Error),
}
