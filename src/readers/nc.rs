use std::path::{Path, PathBuf};

use super::{AttributeMap, AttributeSource, AttributeValue, Number};
use crate::error::{Error, Result};

/// NetCDF input product, open for the lifetime of the reader.
pub struct NcReader {
    path: PathBuf,
    file: netcdf::File,
}

impl NcReader {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = netcdf::open(&path).map_err(|source| Error::Input {
            path: path.clone(),
            source,
        })?;

        Ok(Self { path, file })
    }
}

impl AttributeSource for NcReader {
    fn path(&self) -> &Path {
        &self.path
    }

    fn variable_names(&self) -> Vec<String> {
        self.file.variables().map(|var| var.name()).collect()
    }

    fn global_attributes(&self) -> Result<AttributeMap> {
        collect_attributes(self.file.attributes())
    }

    fn variable_attributes(&self, variable: &str) -> Result<Option<AttributeMap>> {
        match self.file.variable(variable) {
            Some(var) => Ok(Some(collect_attributes(var.attributes())?)),
            None => Ok(None),
        }
    }
}

fn collect_attributes<'a>(
    attributes: impl Iterator<Item = netcdf::Attribute<'a>>,
) -> Result<AttributeMap> {
    let mut map = AttributeMap::new();
    for attribute in attributes {
        let value = attribute.value()?;
        map.insert(attribute.name().to_string(), AttributeValue::from(value));
    }
    Ok(map)
}

fn numbers<T, F: Fn(T) -> Number>(values: Vec<T>, f: F) -> AttributeValue {
    AttributeValue::NumberList(values.into_iter().map(f).collect())
}

// Single valued attributes are scalars, longer ones are lists
impl From<netcdf::AttributeValue> for AttributeValue {
    fn from(value: netcdf::AttributeValue) -> Self {
        use netcdf::AttributeValue as Nc;

        match value {
            Nc::Uchar(v) => AttributeValue::Number(Number::UInt(v.into())),
            Nc::Uchars(v) => numbers(v, |x| Number::UInt(x.into())),
            Nc::Schar(v) => AttributeValue::Number(Number::Int(v.into())),
            Nc::Schars(v) => numbers(v, |x| Number::Int(x.into())),
            Nc::Ushort(v) => AttributeValue::Number(Number::UInt(v.into())),
            Nc::Ushorts(v) => numbers(v, |x| Number::UInt(x.into())),
            Nc::Short(v) => AttributeValue::Number(Number::Int(v.into())),
            Nc::Shorts(v) => numbers(v, |x| Number::Int(x.into())),
            Nc::Uint(v) => AttributeValue::Number(Number::UInt(v.into())),
            Nc::Uints(v) => numbers(v, |x| Number::UInt(x.into())),
            Nc::Int(v) => AttributeValue::Number(Number::Int(v.into())),
            Nc::Ints(v) => numbers(v, |x| Number::Int(x.into())),
            Nc::Ulonglong(v) => AttributeValue::Number(Number::UInt(v)),
            Nc::Ulonglongs(v) => numbers(v, Number::UInt),
            Nc::Longlong(v) => AttributeValue::Number(Number::Int(v)),
            Nc::Longlongs(v) => numbers(v, Number::Int),
            Nc::Float(v) => AttributeValue::Number(Number::Float(v)),
            Nc::Floats(v) => numbers(v, Number::Float),
            Nc::Double(v) => AttributeValue::Number(Number::Double(v)),
            Nc::Doubles(v) => numbers(v, Number::Double),
            Nc::Str(v) => AttributeValue::Text(v),
            Nc::Strs(v) => AttributeValue::TextList(v),
            #[allow(unreachable_patterns)]
            other => AttributeValue::Text(format!("{:?}", other)),
        }
    }
}
