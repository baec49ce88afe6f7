// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Configuration document I/O.

The loader obtains the raw text of a document (from a file found through the
configured search paths, or from an in-memory string); the parser turns that
text into a generic [`serde_json::Value`] tree. Neither knows anything about
the sections of a scaffold network.
*/

pub mod loader;
pub mod parser;

pub use loader::{read_document, resolve_document_path, DocumentSource, RawDocument, STREAM_NAME};
pub use parser::{parse_document, DocumentFormat, JsonFormat};
