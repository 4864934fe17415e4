// SPDX-License-Identifier: MIT OR Apache-2.0

//! Login and route listing against the permission backend.
mod client;
mod token;

pub use client::{
    Client, ClientError, Credentials, GENERIC_ERROR, INVALID_CREDENTIALS, LOGIN_PATH,
    MALFORMED_AUTH, ROUTES_PATH, Tokens,
};
pub use token::{FileTokenStore, MemoryTokenStore, TokenStore, TokenStoreError};
