//! Channel-based encode stage.
//!
//! The stage runs in its own tokio task and owns it exclusively: items come
//! in through a bounded `mpsc` receiver and encoded chunks go out through
//! another bounded channel. A full output channel stalls the task, which in
//! turn stops draining the input channel, so backpressure reaches the
//! producer without any buffering in between.

use std::sync::Arc;

use log::debug;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::{BuilderError, encoder::row_encoder::RowEncoder};

use super::stage::{EncodeStage, Payload};

/// Summary returned by the encode task once it stops.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StageReport {
    /// Items turned into rows.
    pub accepted: usize,
    /// Chunks delivered downstream, header included.
    pub emitted: usize,
    /// The output receiver was dropped before the input ended.
    pub cancelled: bool,
}

/// Spawns the encode stage as a task.
///
/// Returns the receiving end of the output channel and the task handle. The
/// first failure is forwarded downstream and ends the task. Dropping the
/// returned receiver cancels the task, which then closes `input`.
///
/// Must be called from within a tokio runtime.
pub fn spawn_encode_task(
    encoder: Arc<RowEncoder>,
    mut input: mpsc::Receiver<Payload>,
    capacity: usize,
) -> (
    mpsc::Receiver<Result<String, BuilderError>>,
    JoinHandle<StageReport>,
) {
    let (tx, rx) = mpsc::channel(capacity.max(1));

    let join = tokio::spawn(async move {
        let mut stage = EncodeStage::new(encoder);
        let mut report = StageReport::default();

        debug!("Encode task started");

        'items: while let Some(item) = input.recv().await {
            match stage.accept(item) {
                Ok(emitted) => {
                    for chunk in emitted.into_chunks() {
                        if tx.send(Ok(chunk)).await.is_err() {
                            debug!("Output dropped, stopping encode task");
                            report.cancelled = true;
                            input.close();
                            break 'items;
                        }
                        report.emitted += 1;
                    }
                }
                Err(error) => {
                    debug!("Encode task failed: {}", error);
                    let _ = tx.send(Err(error)).await;
                    input.close();
                    break;
                }
            }
        }

        report.accepted = stage.accepted();
        debug!("Encode task finished: {:?}", report);
        report
    });

    (rx, join)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;
    use tokio::sync::mpsc;

    use super::{StageReport, spawn_encode_task};
    use crate::{BuilderError, core::stage::Payload, encoder::row_encoder::RowEncoderBuilder};

    #[tokio::test]
    async fn task_should_emit_header_then_rows() {
        let encoder = Arc::new(RowEncoderBuilder::new().headers("foo bar").build());
        let (tx, input) = mpsc::channel(2);
        let (mut output, join) = spawn_encode_task(encoder, input, 2);

        tokio::spawn(async move {
            tx.send(Payload::from(json!({"foo": "42", "bar": "bang"})))
                .await
                .unwrap();
            tx.send(Payload::from(r#"{"foo": "43", "bar": "baz"}"#))
                .await
                .unwrap();
        });

        let mut csv = String::new();
        while let Some(chunk) = output.recv().await {
            csv.push_str(&chunk.unwrap());
        }

        assert_eq!(csv, "\"foo\",\"bar\"\n\"42\",\"bang\"\n\"43\",\"baz\"\n");
        assert_eq!(
            join.await.unwrap(),
            StageReport {
                accepted: 2,
                emitted: 3,
                cancelled: false
            }
        );
    }

    #[tokio::test]
    async fn task_should_emit_nothing_for_empty_input() {
        let encoder = Arc::new(RowEncoderBuilder::new().headers("foo").build());
        let (tx, input) = mpsc::channel::<Payload>(1);
        drop(tx);

        let (mut output, join) = spawn_encode_task(encoder, input, 1);

        assert!(output.recv().await.is_none());
        assert_eq!(join.await.unwrap(), StageReport::default());
    }

    #[tokio::test]
    async fn task_should_forward_first_failure_and_stop() {
        let encoder = Arc::new(RowEncoderBuilder::new().headers("foo").build());
        let (tx, input) = mpsc::channel(4);
        tx.send(Payload::from(json!({"foo": 1}))).await.unwrap();
        tx.send(Payload::from("true")).await.unwrap();
        tx.send(Payload::from(json!({"foo": 2}))).await.unwrap();

        let (mut output, join) = spawn_encode_task(encoder, input, 4);

        assert_eq!(output.recv().await, Some(Ok("\"foo\"\n".to_string())));
        assert_eq!(output.recv().await, Some(Ok("\"1\"\n".to_string())));
        assert_eq!(
            output.recv().await,
            Some(Err(BuilderError::UnexpectedPayloadKind {
                kind: "boolean".to_string()
            }))
        );
        assert_eq!(output.recv().await, None);

        let report = join.await.unwrap();
        assert_eq!(report.accepted, 1);
        assert!(tx.is_closed());
    }

    #[tokio::test]
    async fn dropping_output_should_cancel_the_task() {
        let encoder = Arc::new(RowEncoderBuilder::new().headers("foo").build());
        let (tx, input) = mpsc::channel(8);
        for i in 0..8 {
            tx.send(Payload::from(json!({"foo": i}))).await.unwrap();
        }

        let (mut output, join) = spawn_encode_task(encoder, input, 1);
        assert_eq!(output.recv().await, Some(Ok("\"foo\"\n".to_string())));
        drop(output);

        let report = join.await.unwrap();
        assert!(report.cancelled);
        assert!(report.emitted < 9);
        assert!(tx.is_closed());
    }
}
