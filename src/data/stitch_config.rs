//! Stitch configuration (`config.xml`).
//!
//! ```xml
//! <config>
//!   <imageUpper inferiorSlice="2" superiorSlice="7"/>
//!   <imageLower inferiorSlice="0" superiorSlice="3"/>
//! </config>
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::{Result, TraceError};

/// Inclusive range of Z indices taken from one sub-volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceRange {
    pub inferior: usize,
    pub superior: usize,
}

impl SliceRange {
    /// Create a range, rejecting `inferior > superior`.
    pub fn new(inferior: usize, superior: usize) -> Result<Self> {
        if inferior > superior {
            return Err(TraceError::config_invalid(format!(
                "inferiorSlice {} is above superiorSlice {}",
                inferior, superior
            )));
        }
        Ok(Self { inferior, superior })
    }

    /// Number of slices in the range.
    pub fn len(&self) -> usize {
        self.superior - self.inferior + 1
    }

    /// A range always holds at least one slice.
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Z ranges to extract from the upper and lower sub-volumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StitchConfig {
    pub upper: SliceRange,
    pub lower: SliceRange,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(rename = "imageUpper")]
    image_upper: Option<RawRange>,
    #[serde(rename = "imageLower")]
    image_lower: Option<RawRange>,
}

#[derive(Debug, Deserialize)]
struct RawRange {
    #[serde(rename = "@inferiorSlice")]
    inferior: Option<i64>,
    #[serde(rename = "@superiorSlice")]
    superior: Option<i64>,
}

impl StitchConfig {
    /// Create a configuration from two ranges.
    pub fn new(upper: SliceRange, lower: SliceRange) -> Self {
        Self { upper, lower }
    }

    /// Total number of stitched slices.
    pub fn z_dim(&self) -> usize {
        self.upper.len() + self.lower.len()
    }

    /// Parse configuration XML.
    pub fn from_xml_str(xml: &str) -> Result<Self> {
        let raw: RawConfig = quick_xml::de::from_str(xml)
            .map_err(|e| TraceError::config_invalid(format!("malformed XML: {}", e)))?;

        let upper = raw
            .image_upper
            .ok_or_else(|| TraceError::config_invalid("missing <imageUpper> element"))?;
        let lower = raw
            .image_lower
            .ok_or_else(|| TraceError::config_invalid("missing <imageLower> element"))?;

        Ok(Self {
            upper: upper.validate("imageUpper")?,
            lower: lower.validate("imageLower")?,
        })
    }

    /// Read and parse a configuration file.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(TraceError::file_not_found(path));
        }
        let xml = std::fs::read_to_string(path)?;
        let config = Self::from_xml_str(&xml)?;
        log::debug!(
            "Stitch config {:?}: upper {:?}, lower {:?}",
            path,
            config.upper,
            config.lower
        );
        Ok(config)
    }
}

impl RawRange {
    fn validate(self, element: &str) -> Result<SliceRange> {
        let attribute = |value: Option<i64>, name: &str| -> Result<usize> {
            let value = value.ok_or_else(|| {
                TraceError::config_invalid(format!("<{}> is missing {}", element, name))
            })?;
            usize::try_from(value).map_err(|_| {
                TraceError::config_invalid(format!("<{}> {} is negative ({})", element, name, value))
            })
        };

        let inferior = attribute(self.inferior, "inferiorSlice")?;
        let superior = attribute(self.superior, "superiorSlice")?;
        SliceRange::new(inferior, superior)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_config() {
        let xml = r#"<config>
            <imageUpper inferiorSlice="2" superiorSlice="7"/>
            <imageLower inferiorSlice="0" superiorSlice="3"/>
        </config>"#;
        let config = StitchConfig::from_xml_str(xml).unwrap();
        assert_eq!(config.upper, SliceRange::new(2, 7).unwrap());
        assert_eq!(config.lower, SliceRange::new(0, 3).unwrap());
        assert_eq!(config.upper.len(), 6);
        assert_eq!(config.lower.len(), 4);
        assert_eq!(config.z_dim(), 10);
    }

    #[test]
    fn test_missing_attribute() {
        let xml = r#"<config>
            <imageUpper inferiorSlice="2"/>
            <imageLower inferiorSlice="0" superiorSlice="3"/>
        </config>"#;
        let err = StitchConfig::from_xml_str(xml).unwrap_err();
        assert!(matches!(err, TraceError::ConfigInvalid { .. }));
        assert!(err.to_string().contains("superiorSlice"));
    }

    #[test]
    fn test_missing_element() {
        let xml = r#"<config><imageUpper inferiorSlice="2" superiorSlice="7"/></config>"#;
        let err = StitchConfig::from_xml_str(xml).unwrap_err();
        assert!(err.to_string().contains("imageLower"));
    }

    #[test]
    fn test_negative_attribute() {
        let xml = r#"<config>
            <imageUpper inferiorSlice="-1" superiorSlice="7"/>
            <imageLower inferiorSlice="0" superiorSlice="3"/>
        </config>"#;
        let err = StitchConfig::from_xml_str(xml).unwrap_err();
        assert!(err.to_string().contains("negative"));
    }

    #[test]
    fn test_inverted_range() {
        assert!(SliceRange::new(5, 4).is_err());
        assert_eq!(SliceRange::new(4, 4).unwrap().len(), 1);
    }

    #[test]
    fn test_missing_file() {
        let err = StitchConfig::from_file(Path::new("/nonexistent/config.xml")).unwrap_err();
        assert!(matches!(err, TraceError::FileNotFound { .. }));
    }
}
