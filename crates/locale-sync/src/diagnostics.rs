use std::fmt;
use std::io::Write;
use std::sync::Mutex;

/// Verbose diagnostic output, switched on per run.
///
/// Handed explicitly to the puller and to transport clients. When disabled,
/// nothing is written.
pub struct Diagnostics {
    enabled: bool,
    sink: Mutex<Box<dyn Write + Send>>,
}

impl Diagnostics {
    pub fn new(enabled: bool, sink: impl Write + Send + 'static) -> Self {
        Self {
            enabled,
            sink: Mutex::new(Box::new(sink)),
        }
    }

    pub fn disabled() -> Self {
        Self::new(false, std::io::sink())
    }

    pub fn stderr(enabled: bool) -> Self {
        Self::new(enabled, std::io::stderr())
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn line(&self, args: fmt::Arguments<'_>) {
        if !self.enabled {
            return;
        }
        if let Ok(mut sink) = self.sink.lock() {
            let _ = writeln!(sink, "{args}");
        }
    }

    /// Write `label: value`.
    pub fn field(&self, label: &str, value: impl fmt::Display) {
        self.line(format_args!("{label}: {value}"));
    }

    /// Write a field whose value may be absent.
    pub fn optional_field<T: fmt::Display>(&self, label: &str, value: Option<T>) {
        match value {
            Some(v) => self.field(label, v),
            None => self.field(label, "<unset>"),
        }
    }

    pub fn separator(&self) {
        self.line(format_args!("{}", "-".repeat(10)));
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::disabled()
    }
}

impl fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Diagnostics")
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}
