use bytes::Bytes;
use core::fmt;

/// A named backend command with its ordered arguments.
///
/// The engine never interprets either part: both are forwarded verbatim to
/// [`Connection::execute`](crate::Connection::execute).
///
/// # Example
/// ```
/// use kvpress::Command;
///
/// let cmd = Command::new("set").arg("key-1").arg("value-1");
/// assert_eq!(cmd.name(), "set");
/// assert_eq!(cmd.args().len(), 2);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Command {
    name: String,
    args: Vec<Bytes>,
}

impl Command {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Appends a single argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<Bytes>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends every argument yielded by `args`, preserving order.
    #[must_use]
    pub fn args_from<I, A>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<Bytes>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn args(&self) -> &[Bytes] {
        &self.args
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        list.entry(&self.name);
        for arg in &self.args {
            match core::str::from_utf8(arg) {
                Ok(s) => list.entry(&s),
                Err(_) => list.entry(arg),
            };
        }
        list.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserves_argument_order() {
        let cmd = Command::new("tikv.put")
            .arg("pkey-7")
            .args_from(["a", "b"])
            .arg(Bytes::from_static(b"\x00\x01"));

        assert_eq!(cmd.name(), "tikv.put");
        let args: Vec<&[u8]> = cmd.args().iter().map(|a| a.as_ref()).collect();
        assert_eq!(args, vec![&b"pkey-7"[..], b"a", b"b", b"\x00\x01"]);
    }

    #[test]
    fn debug_renders_text_args_as_strings() {
        let cmd = Command::new("get").arg("key-1");
        assert_eq!(format!("{cmd:?}"), r#"["get", "key-1"]"#);
    }
}
