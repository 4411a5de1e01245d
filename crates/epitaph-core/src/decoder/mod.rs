//! Artifact framing and the decode entry point.
//!
//! An artifact is laid out as:
//!
//! ```text
//! [ magic: 4 bytes ][ version: u32, big-endian ][ message-tree bytes... ]
//! ```
//!
//! Decoding proceeds in three strictly ordered stages:
//!
//! 1. Header validation: truncation, magic, then version. Nothing past the
//!    header is inspected unless all three checks pass.
//! 2. Schema decode: the payload is parsed into the wire message structs
//!    by `prost`.
//! 3. Report building: every section is validated and the immutable
//!    [`CrashReport`] graph assembled.
//!
//! Any failure at any stage aborts the whole decode with a single typed
//! [`Error`](crate::Error); there are no partial results.

mod builder;
pub(crate) mod wire;

use prost::Message;
use tracing::debug;

use crate::error::{Error, Result};
use crate::report::CrashReport;

/// Magic bytes identifying the crash-report format family
pub const MAGIC: [u8; 4] = *b"EPCR";

/// The one artifact format version this decoder supports
pub const FORMAT_VERSION: u32 = 1;

/// Size of the framing header in bytes (magic + version)
pub const HEADER_SIZE: usize = 8;

/// Validates the framing header and returns the payload subslice.
///
/// Checks are ordered: truncation first, then magic, then version. The
/// version bytes are not inspected when the magic does not match.
pub(crate) fn split_header(data: &[u8]) -> Result<&[u8]> {
    if data.len() <= HEADER_SIZE {
        return Err(Error::truncated(data.len(), HEADER_SIZE));
    }

    if data[..4] != MAGIC {
        return Err(Error::InvalidHeader);
    }

    let version = u32::from_be_bytes([data[4], data[5], data[6], data[7]]);
    if version != FORMAT_VERSION {
        return Err(Error::unsupported_version(version, FORMAT_VERSION));
    }

    Ok(&data[HEADER_SIZE..])
}

/// Decodes a crash-report artifact into a typed, validated [`CrashReport`].
///
/// This is the sole entry point of the decoding engine. It is a pure,
/// synchronous computation over the in-memory buffer with no I/O, no
/// retries, and no partial results: the call returns either a fully valid
/// report or the first invariant violation encountered.
///
/// # Errors
///
/// Returns a framing error (`TruncatedInput`, `InvalidHeader`,
/// `UnsupportedVersion`) when the buffer is not a supported artifact,
/// `MalformedMessageTree` when the payload is not parseable, and
/// `MissingSection` / `MissingField` / `InvalidFieldValue` when the message
/// tree violates the report schema.
pub fn decode(data: &[u8]) -> Result<CrashReport> {
    debug!("Decoding artifact of {} bytes", data.len());

    let payload = split_header(data)?;
    let raw = wire::CrashReport::decode(payload)?;
    let report = builder::build_report(raw)?;

    debug!(
        "Decode complete: {} threads, {} images",
        report.threads().len(),
        report.binary_images().len()
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{Architecture, OperatingSystem, TypeEncoding};
    use bytes::Bytes;
    use pretty_assertions::assert_eq;

    /// Frames a wire-level report into a complete artifact buffer
    fn artifact(raw: &wire::CrashReport) -> Vec<u8> {
        let mut buf = Vec::with_capacity(HEADER_SIZE + raw.encoded_len());
        buf.extend_from_slice(&MAGIC);
        buf.extend_from_slice(&FORMAT_VERSION.to_be_bytes());
        raw.encode(&mut buf).unwrap();
        buf
    }

    fn thread(number: u32, crashed: bool, pcs: &[u64]) -> wire::Thread {
        wire::Thread {
            thread_number: Some(number),
            frames: pcs
                .iter()
                .map(|&pc| wire::StackFrame {
                    pc: Some(pc),
                    symbol: None,
                })
                .collect(),
            crashed: Some(crashed),
            registers: vec![],
        }
    }

    fn image(name: &str, base_address: u64, size: u64) -> wire::BinaryImage {
        wire::BinaryImage {
            base_address: Some(base_address),
            size: Some(size),
            name: Some(name.to_string()),
            uuid: None,
            code_type: None,
        }
    }

    fn minimal_wire_report() -> wire::CrashReport {
        wire::CrashReport {
            system_info: Some(wire::SystemInfo {
                operating_system: Some(wire::OperatingSystem::MacOsX as i32),
                os_version: Some("13.2.1".to_string()),
                architecture: Some(wire::Architecture::Armv7 as i32),
                timestamp: Some(1_660_000_000),
                os_build: None,
            }),
            application_info: Some(wire::ApplicationInfo {
                identifier: Some("com.example.app".to_string()),
                version: Some("7".to_string()),
                marketing_version: None,
            }),
            threads: vec![thread(0, true, &[0x1040])],
            binary_images: vec![image("/usr/bin/example", 0x1000, 0x4000)],
            signal: Some(wire::Signal {
                name: Some("SIGBUS".to_string()),
                code: Some("BUS_ADRALN".to_string()),
                address: Some(0x1041),
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_truncated_input() {
        for data in [&[][..], &[0x45][..], &MAGIC[..], &[0u8; HEADER_SIZE][..]] {
            assert!(matches!(
                decode(data),
                Err(Error::TruncatedInput { expected: HEADER_SIZE, .. })
            ));
        }
    }

    #[test]
    fn test_invalid_magic() {
        // Both the magic and the version are wrong; the magic check must win
        // because the version bytes are never inspected.
        let mut data = artifact(&minimal_wire_report());
        data[..4].copy_from_slice(b"XXXX");
        data[4..8].copy_from_slice(&99u32.to_be_bytes());

        assert!(matches!(decode(&data), Err(Error::InvalidHeader)));
    }

    #[test]
    fn test_unsupported_version() {
        for version in [0u32, 2, u32::MAX] {
            let mut data = artifact(&minimal_wire_report());
            data[4..8].copy_from_slice(&version.to_be_bytes());

            assert!(matches!(
                decode(&data),
                Err(Error::UnsupportedVersion { found, supported: FORMAT_VERSION })
                    if found == version
            ));
        }
    }

    #[test]
    fn test_malformed_payload() {
        let mut data = Vec::new();
        data.extend_from_slice(&MAGIC);
        data.extend_from_slice(&FORMAT_VERSION.to_be_bytes());
        // An unterminated varint is never a valid message tree
        data.extend_from_slice(&[0xFF, 0xFF, 0xFF, 0xFF]);

        assert!(matches!(decode(&data), Err(Error::MalformedMessageTree(_))));
    }

    #[test]
    fn test_split_header_returns_payload() {
        let data = artifact(&minimal_wire_report());
        let payload = split_header(&data).unwrap();
        assert_eq!(payload.len(), data.len() - HEADER_SIZE);
        assert_eq!(payload, &data[HEADER_SIZE..]);
    }

    #[test]
    fn test_decode_minimal_report() {
        let report = decode(&artifact(&minimal_wire_report())).unwrap();

        assert_eq!(report.system_info().operating_system(), OperatingSystem::MacOsX);
        assert_eq!(report.system_info().architecture(), Architecture::Armv7);
        assert_eq!(report.threads().len(), 1);
        assert!(report.threads()[0].crashed());
        assert_eq!(report.binary_images().len(), 1);
        assert_eq!(report.signal_info().code(), "BUS_ADRALN");
    }

    #[test]
    fn test_decode_synthesizes_processor_without_machine_info() {
        let report = decode(&artifact(&minimal_wire_report())).unwrap();

        // ARMv7 row of the legacy table
        let processor = report.system_info().processor_info();
        assert_eq!(processor.type_encoding(), TypeEncoding::Mach);
        assert_eq!(processor.cpu_type(), 12);
        assert_eq!(processor.cpu_subtype(), 9);
    }

    #[test]
    fn test_decode_full_report() {
        let mut raw = minimal_wire_report();
        raw.machine_info = Some(wire::MachineInfo {
            model: Some("iPhone14,2".to_string()),
            processor: Some(wire::Processor {
                encoding: Some(wire::TypeEncoding::Mach as i32),
                cpu_type: Some(0x0100_000c),
                cpu_subtype: Some(0),
            }),
            processor_count: Some(6),
            logical_processor_count: Some(6),
        });
        raw.process_info = Some(wire::ProcessInfo {
            process_name: Some("example".to_string()),
            process_id: Some(1234),
            process_path: Some("/var/containers/example".to_string()),
            parent_process_name: Some("launchd".to_string()),
            parent_process_id: Some(1),
            native: Some(true),
            start_time: Some(1_659_990_000),
        });
        raw.exception = Some(wire::Exception {
            name: Some("NSGenericException".to_string()),
            reason: Some("unwound".to_string()),
            frames: vec![],
        });
        raw.mach_exception = Some(wire::MachException {
            exception_type: Some(1),
            codes: vec![1, 0x1041],
        });
        raw.report_info = Some(wire::ReportInfo {
            uuid: Some(Bytes::from_static(&[0x42; 16])),
        });
        raw.threads[0].registers = vec![
            wire::RegisterValue {
                name: Some("pc".to_string()),
                value: Some(0x1040),
            },
            wire::RegisterValue {
                name: Some("lr".to_string()),
                value: Some(0x1020),
            },
        ];

        let report = decode(&artifact(&raw)).unwrap();

        assert!(report.has_machine_info());
        assert!(report.has_process_info());
        assert!(report.has_exception_info());
        assert!(report.has_mach_exception_info());
        assert_eq!(report.report_uuid(), Some(&[0x42; 16]));

        // The decoded machine processor wins over legacy synthesis
        assert_eq!(report.system_info().processor_info().cpu_type(), 0x0100_000c);
        assert_eq!(report.machine_info().unwrap().logical_processor_count(), 6);
        assert_eq!(report.process_info().unwrap().process_id(), 1234);
        assert_eq!(report.mach_exception_info().unwrap().codes(), &[1, 0x1041]);

        let registers = report.threads()[0].registers();
        assert_eq!(registers[0].name(), "pc");
        assert_eq!(registers[1].name(), "lr");
    }

    #[test]
    fn test_decode_is_idempotent() {
        let data = artifact(&minimal_wire_report());

        let first = decode(&data).unwrap();
        let second = decode(&data).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_order_preserved() {
        let mut raw = minimal_wire_report();
        raw.threads = vec![thread(0, true, &[0x10, 0x20, 0x30]), thread(1, false, &[0x40])];
        raw.binary_images = vec![
            image("/first", 0x1000, 0x100),
            image("/second", 0x2000, 0x100),
            image("/third", 0x3000, 0x100),
        ];

        let report = decode(&artifact(&raw)).unwrap();

        let pcs: Vec<u64> = report.threads()[0]
            .frames()
            .iter()
            .map(|frame| frame.instruction_pointer())
            .collect();
        assert_eq!(pcs, vec![0x10, 0x20, 0x30]);
        assert_eq!(report.threads()[1].thread_number(), 1);

        let names: Vec<&str> = report
            .binary_images()
            .iter()
            .map(|image| image.name())
            .collect();
        assert_eq!(names, vec!["/first", "/second", "/third"]);
    }

    #[test]
    fn test_decode_rejects_empty_collections() {
        let mut raw = minimal_wire_report();
        raw.threads.clear();
        assert!(matches!(
            decode(&artifact(&raw)),
            Err(Error::MissingSection { section: "threads" })
        ));

        let mut raw = minimal_wire_report();
        raw.binary_images.clear();
        assert!(matches!(
            decode(&artifact(&raw)),
            Err(Error::InvalidFieldValue { field: "binary_images", .. })
        ));
    }

    #[test]
    fn test_decoded_report_find_image() {
        let mut raw = minimal_wire_report();
        raw.binary_images = vec![image("/a", 0x1000, 0x100), image("/b", 0x2000, 0x200)];

        let report = decode(&artifact(&raw)).unwrap();
        assert_eq!(report.find_image(0x1050).unwrap().name(), "/a");
        assert!(report.find_image(0x3000).is_none());
    }
}
