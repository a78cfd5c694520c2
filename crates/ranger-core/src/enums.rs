//! The four closed vocabularies used across the data model.
//!
//! All of them are parsed the same way: trim, lower-case, match against the
//! closed set. Source spreadsheets mix capitalisation freely ("Private",
//! "WET", "Camera"), so parsing is case-insensitive by policy; serialised
//! forms are always the lower-case token.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Trim and ASCII-lowercase a raw field before matching it against a closed
/// set. Shared by all four enum parsers.
fn fold(raw: &str) -> String { raw.trim().to_ascii_lowercase() }

// ─── Tenure ──────────────────────────────────────────────────────────────────

/// Land tenure of a monitoring site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tenure {
  Private,
  Public,
}

impl Tenure {
  pub fn parse(raw: &str) -> Result<Self> {
    match fold(raw).as_str() {
      "private" => Ok(Self::Private),
      "public" => Ok(Self::Public),
      _ => Err(Error::UnknownTenureType(raw.to_string())),
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Private => "private",
      Self::Public => "public",
    }
  }
}

// ─── Forest ──────────────────────────────────────────────────────────────────

/// Broad forest classification of a site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Forest {
  Dry,
  Wet,
}

impl Forest {
  pub fn parse(raw: &str) -> Result<Self> {
    match fold(raw).as_str() {
      "dry" => Ok(Self::Dry),
      "wet" => Ok(Self::Wet),
      _ => Err(Error::UnknownForestType(raw.to_string())),
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Dry => "dry",
      Self::Wet => "wet",
    }
  }
}

// ─── Taxa ────────────────────────────────────────────────────────────────────

/// Taxonomic group of a species.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Taxa {
  Bird,
  Mammal,
  Reptile,
  Amphibian,
  Invertebrate,
  Plant,
}

impl Taxa {
  pub fn parse(raw: &str) -> Result<Self> {
    match fold(raw).as_str() {
      "bird" => Ok(Self::Bird),
      "mammal" => Ok(Self::Mammal),
      "reptile" => Ok(Self::Reptile),
      "amphibian" => Ok(Self::Amphibian),
      "invertebrate" => Ok(Self::Invertebrate),
      "plant" => Ok(Self::Plant),
      _ => Err(Error::UnknownTaxa(raw.to_string())),
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Bird => "bird",
      Self::Mammal => "mammal",
      Self::Reptile => "reptile",
      Self::Amphibian => "amphibian",
      Self::Invertebrate => "invertebrate",
      Self::Plant => "plant",
    }
  }
}

// ─── Method ──────────────────────────────────────────────────────────────────

/// How an observation was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
  Audio,
  Camera,
  Observed,
}

impl Method {
  pub fn parse(raw: &str) -> Result<Self> {
    match fold(raw).as_str() {
      "audio" => Ok(Self::Audio),
      "camera" => Ok(Self::Camera),
      "observed" => Ok(Self::Observed),
      _ => Err(Error::UnknownMethod(raw.to_string())),
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Audio => "audio",
      Self::Camera => "camera",
      Self::Observed => "observed",
    }
  }
}
