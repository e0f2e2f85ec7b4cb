use std::sync::mpsc::{self, Receiver, Sender};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTone {
    Running,
    Stopped,
    Warning,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    Log(String),
    Status(String, StatusTone),
}

/// Sink for the engine's log and status streams.
pub trait Reporter: Send + Sync {
    /// `line` is newline-terminated.
    fn log(&self, line: &str);
    fn status(&self, text: &str, tone: StatusTone);
}

/// Forwards reports over an mpsc channel so a UI thread can drain them.
pub struct ChannelReporter {
    tx: Sender<Report>,
}

impl ChannelReporter {
    pub fn new() -> (Self, Receiver<Report>) {
        let (tx, rx) = mpsc::channel();
        (Self { tx }, rx)
    }
}

impl Reporter for ChannelReporter {
    fn log(&self, line: &str) {
        // The receiver only goes away when the UI is shutting down.
        let _ = self.tx.send(Report::Log(line.to_string()));
    }

    fn status(&self, text: &str, tone: StatusTone) {
        let _ = self.tx.send(Report::Status(text.to_string(), tone));
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct RecordingReporter {
        reports: Mutex<Vec<Report>>,
    }

    impl RecordingReporter {
        pub fn reports(&self) -> Vec<Report> {
            self.reports.lock().unwrap().clone()
        }

        pub fn logs(&self) -> Vec<String> {
            self.reports()
                .into_iter()
                .filter_map(|r| match r {
                    Report::Log(line) => Some(line),
                    Report::Status(..) => None,
                })
                .collect()
        }

        pub fn statuses(&self) -> Vec<(String, StatusTone)> {
            self.reports()
                .into_iter()
                .filter_map(|r| match r {
                    Report::Status(text, tone) => Some((text, tone)),
                    Report::Log(_) => None,
                })
                .collect()
        }
    }

    impl Reporter for RecordingReporter {
        fn log(&self, line: &str) {
            self.reports.lock().unwrap().push(Report::Log(line.to_string()));
        }

        fn status(&self, text: &str, tone: StatusTone) {
            self.reports
                .lock()
                .unwrap()
                .push(Report::Status(text.to_string(), tone));
        }
    }
}
