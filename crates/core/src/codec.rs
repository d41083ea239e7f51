// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Text codecs for queue records.
//!
//! A record is stored as a single line, so an encoded value must not contain
//! a newline.

use std::marker::PhantomData;

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{Error, Result};

/// Converts values to and from their persisted text form.
pub trait Codec<T>: Send + Sync {
    fn encode(&self, value: &T) -> Result<String>;

    fn decode(&self, text: &str) -> Result<T>;
}

impl<T, C: Codec<T> + ?Sized> Codec<T> for Box<C> {
    fn encode(&self, value: &T) -> Result<String> {
        (**self).encode(value)
    }

    fn decode(&self, text: &str) -> Result<T> {
        (**self).decode(text)
    }
}

/// Compact JSON, one value per line.
pub struct JsonCodec<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonCodec<T> {
    pub fn new() -> Self {
        JsonCodec { _marker: PhantomData }
    }
}

impl<T> Default for JsonCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for JsonCodec<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T: Serialize + DeserializeOwned> Codec<T> for JsonCodec<T> {
    fn encode(&self, value: &T) -> Result<String> {
        let json = serde_json::to_string(value)?;
        if json.contains('\n') {
            return Err(Error::CorruptedData("encoded record contains a newline".into()));
        }
        Ok(json)
    }

    fn decode(&self, text: &str) -> Result<T> {
        Ok(serde_json::from_str(text)?)
    }
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod tests;
