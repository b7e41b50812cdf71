//! Core XML parsing primitives
//!
//! This module contains the fundamental building blocks for XML parsing:
//! - Scanner: SIMD-accelerated delimiter detection using memchr
//! - Tokenizer: Resumable state machine for XML token extraction
//! - Entities: XML entity decoding with Cow (zero-copy when possible), output escaping
//! - Attributes: Attribute parsing and extraction
//! - Encoding: BOM/declaration detection and conversion to UTF-8

pub mod attributes;
pub mod encoding;
pub mod entities;
pub mod scanner;
pub mod tokenizer;
