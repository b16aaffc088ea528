use std::time::{Duration, Instant};

use log::{debug, error};

use crate::{BuilderError, encoder::row_encoder::RowEncoder};

use super::{
    build_name,
    item::{ItemReader, ItemWriter},
    stage::{EncodeStream, Payload},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Started,
    Success,
    Error,
}

/// Outcome of [`EncodeStep::execute`].
#[derive(Debug)]
pub struct StepExecution {
    pub name: String,
    pub start: Instant,
    pub end: Instant,
    pub duration: Duration,
    pub status: StepStatus,
    /// Items accepted and encoded by the stage.
    pub read_count: usize,
    /// Data rows handed to the writer, header excluded.
    pub write_count: usize,
    pub header_written: bool,
    /// First failure, if any.
    pub error: Option<BuilderError>,
}

/// Drives items from a reader through an encode stage into a writer.
///
/// The writer is flushed every `commit_interval` data rows and once more at
/// the end. Any failure, from the producer, the stage or the writer, stops
/// the step without pulling further items; rows already written stay
/// written and the writer is still closed.
pub struct EncodeStep<'a> {
    name: String,
    encoder: &'a RowEncoder,
    reader: &'a dyn ItemReader<Payload>,
    writer: &'a dyn ItemWriter<String>,
    commit_interval: usize,
}

impl<'a> EncodeStep<'a> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn execute(&self) -> StepExecution {
        let start = Instant::now();

        debug!("Start of step: {}", self.name);

        let mut write_count = 0;
        let mut header_written = false;
        let mut read_count = 0;
        let mut failure = self.writer.open().err();

        if failure.is_none() {
            let mut stream = EncodeStream::new(self.encoder, self.reader);

            for chunk in stream.by_ref() {
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(err) => {
                        failure = Some(err);
                        break;
                    }
                };

                if let Err(err) = self.writer.write(&chunk) {
                    failure = Some(err);
                    break;
                }

                // The header, when present, is always the first chunk.
                if !header_written {
                    header_written = true;
                    continue;
                }

                write_count += 1;
                if write_count % self.commit_interval == 0 {
                    if let Err(err) = self.writer.flush() {
                        failure = Some(err);
                        break;
                    }
                }
            }

            read_count = stream.stage().accepted();
        }

        Self::keep_first(&mut failure, self.writer.flush());
        Self::keep_first(&mut failure, self.writer.close());

        let status = match &failure {
            Some(err) => {
                error!("Step {} failed after {} rows: {}", self.name, write_count, err);
                StepStatus::Error
            }
            None => StepStatus::Success,
        };

        debug!("End of step: {}", self.name);

        StepExecution {
            name: self.name.clone(),
            start,
            end: Instant::now(),
            duration: start.elapsed(),
            status,
            read_count,
            write_count,
            header_written,
            error: failure,
        }
    }

    fn keep_first(failure: &mut Option<BuilderError>, result: Result<(), BuilderError>) {
        if let Err(err) = result {
            if failure.is_none() {
                *failure = Some(err);
            } else {
                debug!("Ignoring secondary writer error: {}", err);
            }
        }
    }
}

pub struct EncodeStepBuilder<'a> {
    name: Option<String>,
    encoder: &'a RowEncoder,
    reader: Option<&'a dyn ItemReader<Payload>>,
    writer: Option<&'a dyn ItemWriter<String>>,
    commit_interval: usize,
}

impl<'a> EncodeStepBuilder<'a> {
    pub fn new(encoder: &'a RowEncoder) -> EncodeStepBuilder<'a> {
        Self {
            name: None,
            encoder,
            reader: None,
            writer: None,
            commit_interval: 1,
        }
    }

    pub fn name(mut self, name: String) -> EncodeStepBuilder<'a> {
        self.name = Some(name);
        self
    }

    pub fn reader(mut self, reader: &'a impl ItemReader<Payload>) -> EncodeStepBuilder<'a> {
        self.reader = Some(reader);
        self
    }

    pub fn writer(mut self, writer: &'a impl ItemWriter<String>) -> EncodeStepBuilder<'a> {
        self.writer = Some(writer);
        self
    }

    pub fn commit_interval(mut self, commit_interval: usize) -> EncodeStepBuilder<'a> {
        self.commit_interval = commit_interval;
        self
    }

    pub fn build(self) -> Result<EncodeStep<'a>, BuilderError> {
        let reader = self
            .reader
            .ok_or_else(|| BuilderError::InvalidArgument("step has no reader".to_string()))?;
        let writer = self
            .writer
            .ok_or_else(|| BuilderError::InvalidArgument("step has no writer".to_string()))?;
        if self.commit_interval == 0 {
            return Err(BuilderError::InvalidArgument(
                "commit interval must be at least 1".to_string(),
            ));
        }

        Ok(EncodeStep {
            name: self.name.unwrap_or_else(build_name),
            encoder: self.encoder,
            reader,
            writer,
            commit_interval: self.commit_interval,
        })
    }
}
