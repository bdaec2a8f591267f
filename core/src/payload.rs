//! Task payload framing.
//!
//! A [`TaskPayload`] travels inside the opaque payload of a submitted task.
//! Every field is written as an 8 digit lowercase hexadecimal byte count
//! followed by the raw bytes:
//!
//! ```text
//! <len(method_name)><method_name><len(arguments)><arguments>[<len(dep)><dep>]*
//! ```
//!
//! Data dependencies are read until the buffer is exhausted, so an empty
//! dependency list costs nothing on the wire.

use crate::error::{CoreError, CoreResult};

/// Width of a length prefix, in hexadecimal digits.
const PREFIX_WIDTH: usize = 8;

/// Description of a method call to run on a worker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPayload {
    /// Name of the method the worker service dispatches on
    pub method_name: String,
    /// Serialized method arguments, opaque to the SDK
    pub arguments: Vec<u8>,
    /// Result ids the task depends on
    pub data_dependencies: Vec<String>,
}

impl TaskPayload {
    /// Create a payload without data dependencies
    pub fn new(method_name: impl Into<String>, arguments: impl Into<Vec<u8>>) -> Self {
        Self {
            method_name: method_name.into(),
            arguments: arguments.into(),
            data_dependencies: Vec::new(),
        }
    }

    /// Add data dependencies to the payload
    pub fn with_dependencies<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.data_dependencies
            .extend(dependencies.into_iter().map(Into::into));
        self
    }

    /// Encode the payload into its wire representation.
    ///
    /// Fails only if a field is larger than `u32::MAX` bytes.
    pub fn serialize(&self) -> CoreResult<Vec<u8>> {
        let capacity = PREFIX_WIDTH * (2 + self.data_dependencies.len())
            + self.method_name.len()
            + self.arguments.len()
            + self.data_dependencies.iter().map(String::len).sum::<usize>();
        let mut out = Vec::with_capacity(capacity);

        write_field(&mut out, self.method_name.as_bytes())?;
        write_field(&mut out, &self.arguments)?;
        for dependency in &self.data_dependencies {
            write_field(&mut out, dependency.as_bytes())?;
        }
        Ok(out)
    }

    /// Decode a payload from its wire representation.
    ///
    /// Arguments are kept as raw bytes, but the method name and every data
    /// dependency must be valid UTF-8. Payloads from producers that put
    /// arbitrary bytes in those fields are rejected with
    /// [`CoreError::PayloadFormat`].
    pub fn deserialize(bytes: &[u8]) -> CoreResult<Self> {
        let mut reader = FieldReader { rest: bytes };

        let method_name = utf8_field(reader.next_field()?, "method name")?;
        let arguments = reader.next_field()?.to_vec();

        let mut data_dependencies = Vec::new();
        while !reader.rest.is_empty() {
            data_dependencies.push(utf8_field(reader.next_field()?, "data dependency")?);
        }

        Ok(Self {
            method_name,
            arguments,
            data_dependencies,
        })
    }
}

fn write_field(out: &mut Vec<u8>, field: &[u8]) -> CoreResult<()> {
    let len = u32::try_from(field.len()).map_err(|_| {
        CoreError::PayloadFormat(format!(
            "field of {} bytes does not fit a 32-bit length prefix",
            field.len()
        ))
    })?;
    out.extend_from_slice(format!("{len:08x}").as_bytes());
    out.extend_from_slice(field);
    Ok(())
}

fn utf8_field(raw: &[u8], what: &str) -> CoreResult<String> {
    String::from_utf8(raw.to_vec())
        .map_err(|e| CoreError::PayloadFormat(format!("{what} is not valid UTF-8: {e}")))
}

struct FieldReader<'a> {
    rest: &'a [u8],
}

impl<'a> FieldReader<'a> {
    fn next_field(&mut self) -> CoreResult<&'a [u8]> {
        if self.rest.len() < PREFIX_WIDTH {
            return Err(CoreError::PayloadFormat(format!(
                "truncated length prefix: {} bytes left, {} needed",
                self.rest.len(),
                PREFIX_WIDTH
            )));
        }
        let (prefix, rest) = self.rest.split_at(PREFIX_WIDTH);
        let len = parse_prefix(prefix)?;
        if len > rest.len() {
            return Err(CoreError::PayloadFormat(format!(
                "field length {len} exceeds the {} remaining bytes",
                rest.len()
            )));
        }
        let (field, rest) = rest.split_at(len);
        self.rest = rest;
        Ok(field)
    }
}

fn parse_prefix(prefix: &[u8]) -> CoreResult<usize> {
    if !prefix.iter().all(u8::is_ascii_hexdigit) {
        return Err(CoreError::PayloadFormat(format!(
            "length prefix {:?} is not hexadecimal",
            String::from_utf8_lossy(prefix)
        )));
    }
    // Eight hex digits always fit a u32 once validated above.
    let text = std::str::from_utf8(prefix)
        .map_err(|e| CoreError::PayloadFormat(format!("length prefix: {e}")))?;
    let len = u32::from_str_radix(text, 16)
        .map_err(|e| CoreError::PayloadFormat(format!("length prefix {text:?}: {e}")))?;
    Ok(len as usize)
}
