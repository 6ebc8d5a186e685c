use crate::config::BandSpec;
use crate::error::{Error, Result};
use crate::readers::{AttributeMap, AttributeSource, netcdf_subdataset};

/// A configured band matched against the variables of the input product.
#[derive(Debug, Clone)]
pub struct ResolvedBand<'a> {
    pub spec: &'a BandSpec,
    /// GDAL subdataset name of the variable
    pub source: String,
    pub attributes: AttributeMap,
}

impl ResolvedBand<'_> {
    pub fn in_band(&self) -> &str {
        &self.spec.in_band
    }

    pub fn out_band(&self) -> &str {
        self.spec.resolved_out_band()
    }

    pub fn description(&self) -> &str {
        &self.spec.description
    }

    pub fn resample_method(&self) -> &str {
        &self.spec.resample_method
    }
}

/// Resolves every configured band, in configuration order. Nothing is returned
/// unless all of them exist in the input.
pub fn resolve_bands<'a, S: AttributeSource>(
    source: &S,
    bands: &'a [BandSpec],
) -> Result<Vec<ResolvedBand<'a>>> {
    let mut resolved = Vec::with_capacity(bands.len());

    for spec in bands {
        let Some(attributes) = source.variable_attributes(&spec.in_band)? else {
            return Err(Error::BandNotFound {
                band: spec.in_band.clone(),
                path: source.path().to_path_buf(),
                available: source.variable_names(),
            });
        };

        resolved.push(ResolvedBand {
            spec,
            source: netcdf_subdataset(source.path(), &spec.in_band),
            attributes,
        });
    }

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::readers::AttributeValue;
    use std::collections::BTreeMap;
    use std::path::{Path, PathBuf};

    struct MemorySource {
        path: PathBuf,
        variables: BTreeMap<String, AttributeMap>,
    }

    impl MemorySource {
        fn new(variables: &[&str]) -> Self {
            let variables = variables
                .iter()
                .map(|name| {
                    let attributes = AttributeMap::from([(
                        "long_name".to_string(),
                        AttributeValue::from(format!("{} long name", name).as_str()),
                    )]);
                    (name.to_string(), attributes)
                })
                .collect();

            Self {
                path: PathBuf::from("/data/c_gls_NDVI300_202404010000_GLOBE_OLCI_V2.0.1.nc"),
                variables,
            }
        }
    }

    impl AttributeSource for MemorySource {
        fn path(&self) -> &Path {
            &self.path
        }

        fn variable_names(&self) -> Vec<String> {
            self.variables.keys().cloned().collect()
        }

        fn global_attributes(&self) -> Result<AttributeMap> {
            Ok(AttributeMap::new())
        }

        fn variable_attributes(&self, variable: &str) -> Result<Option<AttributeMap>> {
            Ok(self.variables.get(variable).cloned())
        }
    }

    #[test]
    fn test_bands_keep_configuration_order() {
        let source = MemorySource::new(&["NDVI", "NOBS", "QFLAG", "TIME_GRID"]);
        let mut qflag = BandSpec::new("QFLAG", "mode");
        qflag.out_band = Some("QF".to_string());
        let bands = vec![qflag, BandSpec::new("NDVI", "average"), BandSpec::new("NOBS", "nearest")];

        let resolved = resolve_bands(&source, &bands).unwrap();

        let names: Vec<(&str, &str)> = resolved
            .iter()
            .map(|b| (b.in_band(), b.out_band()))
            .collect();
        assert_eq!(names, vec![("QFLAG", "QF"), ("NDVI", "NDVI"), ("NOBS", "NOBS")]);
        assert_eq!(resolved[1].resample_method(), "average");
        assert_eq!(
            resolved[1].source,
            "NETCDF:\"/data/c_gls_NDVI300_202404010000_GLOBE_OLCI_V2.0.1.nc\":NDVI"
        );
        assert_eq!(
            resolved[0].attributes.get("long_name"),
            Some(&AttributeValue::from("QFLAG long name"))
        );
    }

    #[test]
    fn test_missing_band_fails() {
        let source = MemorySource::new(&["NDVI"]);
        let bands = vec![BandSpec::new("NDVI", "average"), BandSpec::new("FOO", "average")];

        match resolve_bands(&source, &bands) {
            Err(Error::BandNotFound { band, available, .. }) => {
                assert_eq!(band, "FOO");
                assert_eq!(available, vec!["NDVI".to_string()]);
            }
            other => panic!("expected BandNotFound, got {:?}", other),
        }
    }
}
