use std::fs;
use std::path::Path;
use tempfile::TempDir;
use txt2vcf_convert::{
    AlwaysAllow, BatchConfig, ConvertError, Converter, MarkerFileGate, RunGate,
};

struct Deny;

impl RunGate for Deny {
    fn is_authorized(&self) -> txt2vcf_convert::Result<bool> {
        Ok(false)
    }
}

fn batch_config(root: &Path) -> BatchConfig {
    BatchConfig {
        input_dir: root.join("phone_numbers"),
        output_dir: root.join("vcf_files"),
    }
}

fn write_input(config: &BatchConfig, name: &str, contents: &[u8]) {
    fs::create_dir_all(&config.input_dir).expect("create input dir");
    fs::write(config.input_dir.join(name), contents).expect("write input");
}

fn output_names(config: &BatchConfig) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(&config.output_dir)
        .expect("read output dir")
        .map(|entry| {
            entry
                .expect("entry")
                .file_name()
                .to_string_lossy()
                .into_owned()
        })
        .collect();
    names.sort();
    names
}

#[test]
fn converts_single_file_into_cards() {
    let temp = TempDir::new().expect("tempdir");
    let config = batch_config(temp.path());
    write_input(
        &config,
        "alice.txt",
        b"Call me at 555-123-4567 or 555.987.6543",
    );

    let summary = Converter::new(config.clone(), AlwaysAllow)
        .run()
        .expect("run");
    assert_eq!(summary.files_converted, 1);
    assert_eq!(summary.total_contacts, 2);
    assert_eq!(summary.files[0].input, "alice.txt");
    assert_eq!(summary.files[0].contacts, 2);

    let output = fs::read_to_string(config.output_dir.join("alice.vcf")).expect("read output");
    assert_eq!(
        output,
        "BEGIN:VCARD\r\nFN:alice-1\r\nTEL:555-123-4567\r\nEND:VCARD\r\n\n\
         BEGIN:VCARD\r\nFN:alice-2\r\nTEL:555.987.6543\r\nEND:VCARD\r\n"
    );
}

#[test]
fn empty_input_dir_creates_dirs_and_no_outputs() {
    let temp = TempDir::new().expect("tempdir");
    let config = batch_config(temp.path());

    let summary = Converter::new(config.clone(), AlwaysAllow)
        .run()
        .expect("run");
    assert_eq!(summary.files_converted, 0);
    assert_eq!(summary.total_contacts, 0);
    assert!(config.input_dir.is_dir());
    assert!(config.output_dir.is_dir());
    assert!(output_names(&config).is_empty());
}

#[test]
fn file_without_numbers_produces_empty_output() {
    let temp = TempDir::new().expect("tempdir");
    let config = batch_config(temp.path());
    write_input(&config, "empty.txt", b"nothing to see here");

    let summary = Converter::new(config.clone(), AlwaysAllow)
        .run()
        .expect("run");
    assert_eq!(summary.files_converted, 1);
    assert_eq!(summary.total_contacts, 0);
    let output = fs::read_to_string(config.output_dir.join("empty.vcf")).expect("read output");
    assert!(output.is_empty());
}

#[test]
fn files_are_processed_in_sorted_order_without_extension_filter() {
    let temp = TempDir::new().expect("tempdir");
    let config = batch_config(temp.path());
    write_input(&config, "zeta.txt", b"555-000-1111");
    write_input(&config, "alpha.md", b"555-000-2222");
    write_input(&config, "mid", b"555-000-3333 and 555-000-4444");

    let summary = Converter::new(config.clone(), AlwaysAllow)
        .run()
        .expect("run");
    let order: Vec<&str> = summary.files.iter().map(|file| file.input.as_str()).collect();
    assert_eq!(order, vec!["alpha.md", "mid", "zeta.txt"]);
    assert_eq!(summary.total_contacts, 4);
    assert_eq!(output_names(&config), vec!["alpha.vcf", "mid.vcf", "zeta.vcf"]);

    let mid = fs::read_to_string(config.output_dir.join("mid.vcf")).expect("read mid");
    assert!(mid.contains("FN:mid-1\r\nTEL:555-000-3333"));
    assert!(mid.contains("FN:mid-2\r\nTEL:555-000-4444"));
}

#[test]
fn rerun_overwrites_with_identical_output() {
    let temp = TempDir::new().expect("tempdir");
    let config = batch_config(temp.path());
    write_input(&config, "a.txt", b"+1 (415) 555-1212");
    write_input(&config, "b.txt", b"020 7946 0958\n555.987.6543");
    fs::create_dir_all(&config.output_dir).expect("create output dir");
    fs::write(config.output_dir.join("a.vcf"), "stale contents").expect("write stale");

    let converter = Converter::new(config.clone(), AlwaysAllow);
    converter.run().expect("first run");
    let first_a = fs::read(config.output_dir.join("a.vcf")).expect("read a");
    let first_b = fs::read(config.output_dir.join("b.vcf")).expect("read b");

    let second = converter.run().expect("second run");
    assert_eq!(second.files_converted, 2);
    assert_eq!(fs::read(config.output_dir.join("a.vcf")).expect("read a"), first_a);
    assert_eq!(fs::read(config.output_dir.join("b.vcf")).expect("read b"), first_b);
    assert!(!String::from_utf8(first_a).expect("utf8").contains("stale"));
}

#[test]
fn denied_gate_reads_and_writes_nothing() {
    let temp = TempDir::new().expect("tempdir");
    let config = batch_config(temp.path());
    write_input(&config, "alice.txt", b"555-123-4567");

    let err = Converter::new(config.clone(), Deny).run().unwrap_err();
    assert!(matches!(err, ConvertError::GateDenied));
    assert!(config.output_dir.is_dir());
    assert!(output_names(&config).is_empty());
}

#[test]
fn marker_file_gate_controls_the_run() {
    let temp = TempDir::new().expect("tempdir");
    let config = batch_config(temp.path());
    write_input(&config, "alice.txt", b"555-123-4567");
    let run_file = temp.path().join(".run");

    let converter = Converter::new(config.clone(), MarkerFileGate::new(&run_file));
    assert!(matches!(converter.run(), Err(ConvertError::GateDenied)));

    fs::write(&run_file, "False").expect("write run file");
    assert!(matches!(converter.run(), Err(ConvertError::GateDenied)));

    fs::write(&run_file, "True\n").expect("write run file");
    let summary = converter.run().expect("run");
    assert_eq!(summary.files_converted, 1);
}

#[test]
fn invalid_utf8_aborts_batch_and_keeps_earlier_outputs() {
    let temp = TempDir::new().expect("tempdir");
    let config = batch_config(temp.path());
    write_input(&config, "a.txt", b"555-123-4567");
    write_input(&config, "b.txt", &[0xff, 0xfe, 0x35, 0x35]);
    write_input(&config, "c.txt", b"555-987-6543");

    let err = Converter::new(config.clone(), AlwaysAllow)
        .run()
        .unwrap_err();
    match err {
        ConvertError::Decode { path } => assert!(path.ends_with("b.txt")),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(output_names(&config), vec!["a.vcf"]);
}

#[test]
fn subdirectory_entry_is_an_io_error() {
    let temp = TempDir::new().expect("tempdir");
    let config = batch_config(temp.path());
    fs::create_dir_all(config.input_dir.join("nested")).expect("create nested");

    let err = Converter::new(config, AlwaysAllow).run().unwrap_err();
    assert!(matches!(err, ConvertError::Io { .. }));
}

#[test]
fn crlf_and_cr_inputs_convert_like_lf() {
    let convert = |contents: &[u8]| {
        let temp = TempDir::new().expect("tempdir");
        let config = batch_config(temp.path());
        write_input(&config, "list.txt", contents);
        let summary = Converter::new(config.clone(), AlwaysAllow)
            .run()
            .expect("run");
        let body = fs::read(config.output_dir.join("list.vcf")).expect("read output");
        (summary.total_contacts, body)
    };

    let (lf_contacts, lf) = convert(b"555-1234\n555-5678\n");
    let (crlf_contacts, crlf) = convert(b"555-1234\r\n555-5678\r\n");
    let (cr_contacts, cr) = convert(b"555-1234\r555-5678\r");

    assert_eq!(lf_contacts, 1);
    assert_eq!(crlf_contacts, lf_contacts);
    assert_eq!(cr_contacts, lf_contacts);
    assert_eq!(crlf, lf);
    assert_eq!(cr, lf);
}

#[test]
fn run_with_reports_each_file_before_a_later_failure() {
    let temp = TempDir::new().expect("tempdir");
    let config = batch_config(temp.path());
    write_input(&config, "a.txt", b"555-123-4567");
    write_input(&config, "b.txt", b"555-987-6543 and 555-000-1111");
    write_input(&config, "c.txt", &[0xff, 0x35, 0x35]);

    let mut seen = Vec::new();
    let err = Converter::new(config.clone(), AlwaysAllow)
        .run_with(|file| seen.push((file.input.clone(), file.contacts)))
        .unwrap_err();
    assert!(matches!(err, ConvertError::Decode { .. }));
    assert_eq!(
        seen,
        vec![("a.txt".to_string(), 1), ("b.txt".to_string(), 2)]
    );
}
