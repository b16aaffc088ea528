mod common;

use std::{
    fs::read_to_string,
    io::{self, Cursor, ErrorKind},
};

use common::MockFile;
use serde_json::json;

use csv_builder_rs::{
    BuilderError,
    core::{
        stage::{EncodeStream, Payload, read_stream},
        step::{EncodeStepBuilder, StepStatus},
    },
    encoder::row_encoder::RowEncoderBuilder,
    item::{
        lines::LinesItemReaderBuilder, memory::VecItemReader, text_writer::TextItemWriterBuilder,
    },
};

#[test]
fn three_json_items_then_garbage_should_keep_the_three_rows() {
    let _ = env_logger::try_init();

    let encoder = RowEncoderBuilder::new().headers("id name score").build();
    let items = vec![
        r#"{"id": 1, "name": "ann", "score": 9.5}"#,
        r#"{"id": 2, "name": "bob"}"#,
        r#"{"id": 3, "name": "cid", "score": 7}"#,
        "<html>not json</html>",
    ];

    let mut delivered = String::new();
    let mut failure = None;
    for chunk in read_stream(&encoder, items) {
        match chunk {
            Ok(chunk) => delivered.push_str(&chunk),
            Err(err) => failure = Some(err),
        }
    }

    assert_eq!(
        delivered,
        concat!(
            "\"id\",\"name\",\"score\"\n",
            "\"1\",\"ann\",\"9.5\"\n",
            "\"2\",\"bob\",\"\"\n",
            "\"3\",\"cid\",\"7\"\n",
        )
    );
    assert_eq!(delivered.matches("\"id\"").count(), 1);
    assert!(matches!(failure, Some(BuilderError::MalformedPayload(_))));
}

#[test]
fn header_should_be_emitted_once_for_any_number_of_items() {
    let encoder = RowEncoderBuilder::new().headers("n").build();

    for count in 0..6 {
        let items: Vec<Payload> = (0..count).map(|n| Payload::from(json!({"n": n}))).collect();
        let chunks: Vec<String> = read_stream(&encoder, items)
            .collect::<Result<_, _>>()
            .unwrap();

        let headers = chunks.iter().filter(|c| c.as_str() == "\"n\"\n").count();
        if count == 0 {
            assert!(chunks.is_empty());
        } else {
            assert_eq!(headers, 1);
            assert_eq!(chunks[0], "\"n\"\n");
            assert_eq!(chunks.len(), count + 1);
        }
    }
}

#[test]
fn ndjson_file_should_be_encoded_into_a_csv_file() {
    let _ = env_logger::try_init();

    let dir = tempfile::tempdir().unwrap();
    let input_path = dir.path().join("users.ndjson");
    let output_path = dir.path().join("users.csv");
    std::fs::write(
        &input_path,
        concat!(
            "{\"name\": \"User One\", \"meta\": {\"roles\": [\"user\"]}}\n",
            "\n",
            "[\"raw\", \"row\", \"ignored\"]\n",
            "{\"name\": \"User Two\"}\n",
        ),
    )
    .unwrap();

    let encoder = RowEncoderBuilder::new()
        .headers(["Name", "Role"])
        .alias("Name", "name")
        .alias("Role", "meta.roles[0]")
        .build();
    let reader = LinesItemReaderBuilder::new().from_path(&input_path).unwrap();
    let writer = TextItemWriterBuilder::new().from_path(&output_path).unwrap();

    let step = EncodeStepBuilder::new(&encoder)
        .reader(&reader)
        .writer(&writer)
        .commit_interval(2)
        .build()
        .unwrap();
    let execution = step.execute();

    assert_eq!(execution.status, StepStatus::Success);
    assert_eq!(execution.read_count, 3);
    assert_eq!(execution.write_count, 3);
    drop(writer);

    assert_eq!(
        read_to_string(&output_path).unwrap(),
        "\"Name\",\"Role\"\n\"User One\",\"user\"\n\"raw\",\"row\"\n\"User Two\",\"\"\n"
    );
}

#[test]
fn scalar_line_should_stop_the_step_with_its_kind() {
    let encoder = RowEncoderBuilder::new().headers("a").build();
    let reader = LinesItemReaderBuilder::new()
        .from_reader(Cursor::new("{\"a\": 1}\n\"oops\"\n{\"a\": 2}\n"));
    let writer = TextItemWriterBuilder::new().from_writer(Vec::new());

    let step = EncodeStepBuilder::new(&encoder)
        .reader(&reader)
        .writer(&writer)
        .build()
        .unwrap();
    let execution = step.execute();

    assert_eq!(execution.status, StepStatus::Error);
    assert_eq!(
        execution.error,
        Some(BuilderError::UnexpectedPayloadKind {
            kind: "string".to_string()
        })
    );
    assert_eq!(reader.line_count(), 2);
    assert_eq!(
        String::from_utf8(writer.into_inner().unwrap()).unwrap(),
        "\"a\"\n\"1\"\n"
    );
}

#[test]
fn failing_sink_should_stop_the_step() {
    let mut file = MockFile::default();
    let mut calls = 0;
    file.expect_write().returning(move |buf| {
        calls += 1;
        if calls <= 2 {
            Ok(buf.len())
        } else {
            Err(io::Error::new(ErrorKind::BrokenPipe, "consumer went away"))
        }
    });
    file.expect_flush().returning(|| Ok(()));

    let encoder = RowEncoderBuilder::new().headers("n").build();
    let reader = VecItemReader::new(
        (0..10)
            .map(|n| Payload::from(json!({"n": n})))
            .collect(),
    );
    let writer = TextItemWriterBuilder::new().capacity(0).from_writer(file);

    let step = EncodeStepBuilder::new(&encoder)
        .reader(&reader)
        .writer(&writer)
        .build()
        .unwrap();
    let execution = step.execute();

    assert_eq!(execution.status, StepStatus::Error);
    assert!(execution.header_written);
    assert_eq!(execution.write_count, 1);
    match execution.error {
        Some(BuilderError::ItemWriter(message)) => assert!(message.contains("consumer went away")),
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(reader.remaining(), 8);
}

#[cfg(feature = "logger")]
#[test]
fn logger_writer_should_count_every_chunk() {
    use csv_builder_rs::item::logger::LoggerWriter;

    let _ = env_logger::try_init();

    let encoder = RowEncoderBuilder::new().headers("a b").build();
    let reader = VecItemReader::new(vec![
        Payload::from(json!({"a": 1, "b": 2})),
        Payload::from(json!([3, 4])),
    ]);
    let writer = LoggerWriter::default();

    let step = EncodeStepBuilder::new(&encoder)
        .reader(&reader)
        .writer(&writer)
        .build()
        .unwrap();

    assert_eq!(step.execute().status, StepStatus::Success);
    assert_eq!(writer.count(), 3);
}

#[test]
fn stream_over_a_borrowed_reader_should_release_it_when_dropped() {
    let encoder = RowEncoderBuilder::new().headers("a").build();
    let reader = VecItemReader::new(vec![
        Payload::from(json!({"a": 1})),
        Payload::from(json!({"a": 2})),
        Payload::from(json!({"a": 3})),
    ]);

    {
        let mut stream = EncodeStream::new(&encoder, &reader);
        assert_eq!(stream.next(), Some(Ok("\"a\"\n".to_string())));
    }

    // the first item was pulled, the rest stay with the producer
    assert_eq!(reader.remaining(), 2);
}
