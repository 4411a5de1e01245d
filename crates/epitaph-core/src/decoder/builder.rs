//! Construction of the typed report graph from decoded wire messages.
//!
//! Each `build_*` function maps one wire section to its domain entity,
//! enforcing the section's presence, required-field, and value invariants.
//! Construction is bottom-up and first-failure-wins: any child error aborts
//! the parent section via `?`, so no partially-valid entity is ever
//! observable. Optional sections and fields map to `None`; there are no
//! sentinel values in the output graph.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use bytes::Bytes;
use tracing::trace;

use super::wire;
use crate::error::{Error, Result};
use crate::report::{
    ApplicationInfo, Architecture, BinaryImageInfo, CrashReport, ExceptionInfo, MachExceptionInfo,
    MachineInfo, OperatingSystem, ProcessInfo, ProcessorInfo, RegisterInfo, SignalInfo,
    StackFrameInfo, SymbolInfo, SystemInfo, ThreadInfo, TypeEncoding,
};

/// Upper bound on mach exception code list length; the count must fit an
/// 8-bit field in downstream consumers.
const MAX_MACH_EXCEPTION_CODES: usize = 255;

/// Assembles the full report graph from the decoded root message.
pub(crate) fn build_report(raw: wire::CrashReport) -> Result<CrashReport> {
    // Machine info is built before system info so a decoded processor
    // section can take precedence over legacy-architecture synthesis.
    let machine_info = raw.machine_info.map(build_machine_info).transpose()?;

    let system_info = build_system_info(
        raw.system_info
            .ok_or_else(|| Error::missing_section("system_info"))?,
        machine_info
            .as_ref()
            .and_then(|machine| machine.processor_info()),
    )?;

    let application_info = build_application_info(
        raw.application_info
            .ok_or_else(|| Error::missing_section("application_info"))?,
    )?;

    let process_info = raw.process_info.map(build_process_info).transpose()?;

    let signal_info = build_signal(
        raw.signal.ok_or_else(|| Error::missing_section("signal"))?,
    )?;

    let mach_exception_info = raw.mach_exception.map(build_mach_exception).transpose()?;

    if raw.threads.is_empty() {
        return Err(Error::missing_section("threads"));
    }
    let threads = raw
        .threads
        .into_iter()
        .map(build_thread)
        .collect::<Result<Vec<_>>>()?;

    if raw.binary_images.is_empty() {
        return Err(Error::invalid_field(
            "crash_report",
            "binary_images",
            "at least one binary image is required",
        ));
    }
    let binary_images = raw
        .binary_images
        .into_iter()
        .map(build_binary_image)
        .collect::<Result<Vec<_>>>()?;

    let exception_info = raw.exception.map(build_exception).transpose()?;

    let report_uuid = match raw.report_info.and_then(|info| info.uuid) {
        Some(uuid) => Some(uuid_from_bytes(&uuid, "report_info", "uuid")?),
        None => None,
    };

    trace!(
        "Assembled report graph: {} threads, {} images",
        threads.len(),
        binary_images.len()
    );

    Ok(CrashReport {
        report_uuid,
        system_info,
        machine_info,
        application_info,
        process_info,
        signal_info,
        mach_exception_info,
        threads,
        binary_images,
        exception_info,
    })
}

fn build_system_info(
    raw: wire::SystemInfo,
    machine_processor: Option<ProcessorInfo>,
) -> Result<SystemInfo> {
    const SECTION: &str = "system_info";

    let operating_system =
        convert_operating_system(require(raw.operating_system, SECTION, "operating_system")?)?;
    let os_version = require(raw.os_version, SECTION, "os_version")?;
    let architecture =
        convert_architecture(require(raw.architecture, SECTION, "architecture")?)?;

    // 0 means the wall clock was unreadable in the crash context
    let timestamp = match raw.timestamp {
        None | Some(0) => None,
        Some(secs) => Some(timestamp_from_secs(secs, SECTION, "timestamp")?),
    };

    let processor_info = match machine_processor {
        Some(processor) => processor,
        None => {
            trace!(
                "Synthesizing processor info from legacy architecture {:?}",
                architecture
            );
            architecture.legacy_processor_info()
        }
    };

    Ok(SystemInfo {
        operating_system,
        os_version,
        os_build: raw.os_build,
        architecture,
        processor_info,
        timestamp,
    })
}

fn build_machine_info(raw: wire::MachineInfo) -> Result<MachineInfo> {
    const SECTION: &str = "machine_info";

    let processor_info = raw
        .processor
        .map(|processor| build_processor(processor, "machine_info.processor"))
        .transpose()?;

    Ok(MachineInfo {
        model: raw.model,
        processor_info,
        processor_count: require(raw.processor_count, SECTION, "processor_count")?,
        logical_processor_count: require(
            raw.logical_processor_count,
            SECTION,
            "logical_processor_count",
        )?,
    })
}

fn build_processor(raw: wire::Processor, section: &'static str) -> Result<ProcessorInfo> {
    let encoding = require(raw.encoding, section, "encoding")?;
    let encoding = wire::TypeEncoding::try_from(encoding).map_err(|_| {
        Error::invalid_field(
            section,
            "encoding",
            format!("unknown type encoding value {encoding}"),
        )
    })?;
    let type_encoding = match encoding {
        wire::TypeEncoding::Unknown => TypeEncoding::Unknown,
        wire::TypeEncoding::Mach => TypeEncoding::Mach,
    };

    Ok(ProcessorInfo {
        type_encoding,
        cpu_type: require(raw.cpu_type, section, "cpu_type")?,
        cpu_subtype: require(raw.cpu_subtype, section, "cpu_subtype")?,
    })
}

fn build_application_info(raw: wire::ApplicationInfo) -> Result<ApplicationInfo> {
    const SECTION: &str = "application_info";

    Ok(ApplicationInfo {
        identifier: require_non_empty(raw.identifier, SECTION, "identifier")?,
        version: require_non_empty(raw.version, SECTION, "version")?,
        marketing_version: raw.marketing_version,
    })
}

fn build_process_info(raw: wire::ProcessInfo) -> Result<ProcessInfo> {
    const SECTION: &str = "process_info";

    let start_time = raw
        .start_time
        .map(|secs| timestamp_from_secs(secs, SECTION, "start_time"))
        .transpose()?;

    Ok(ProcessInfo {
        process_name: raw.process_name,
        process_path: raw.process_path,
        process_id: require(raw.process_id, SECTION, "process_id")?,
        start_time,
        parent_process_name: raw.parent_process_name,
        parent_process_id: require(raw.parent_process_id, SECTION, "parent_process_id")?,
        native: require(raw.native, SECTION, "native")?,
    })
}

fn build_signal(raw: wire::Signal) -> Result<SignalInfo> {
    const SECTION: &str = "signal";

    Ok(SignalInfo {
        name: require(raw.name, SECTION, "name")?,
        code: require(raw.code, SECTION, "code")?,
        address: require(raw.address, SECTION, "address")?,
    })
}

fn build_mach_exception(raw: wire::MachException) -> Result<MachExceptionInfo> {
    const SECTION: &str = "mach_exception";

    if raw.codes.len() > MAX_MACH_EXCEPTION_CODES {
        return Err(Error::invalid_field(
            SECTION,
            "codes",
            format!(
                "{} entries exceed the 8-bit count limit of {}",
                raw.codes.len(),
                MAX_MACH_EXCEPTION_CODES
            ),
        ));
    }

    Ok(MachExceptionInfo {
        exception_type: require(raw.exception_type, SECTION, "exception_type")?,
        codes: raw.codes,
    })
}

fn build_thread(raw: wire::Thread) -> Result<ThreadInfo> {
    const SECTION: &str = "thread";

    let frames = raw
        .frames
        .into_iter()
        .map(build_stack_frame)
        .collect::<Result<Vec<_>>>()?;
    let registers = raw
        .registers
        .into_iter()
        .map(build_register)
        .collect::<Result<Vec<_>>>()?;

    Ok(ThreadInfo {
        thread_number: require(raw.thread_number, SECTION, "thread_number")?,
        frames,
        crashed: require(raw.crashed, SECTION, "crashed")?,
        registers,
    })
}

fn build_stack_frame(raw: wire::StackFrame) -> Result<StackFrameInfo> {
    const SECTION: &str = "stack_frame";

    Ok(StackFrameInfo {
        instruction_pointer: require(raw.pc, SECTION, "pc")?,
        symbol: raw.symbol.map(build_symbol).transpose()?,
    })
}

fn build_symbol(raw: wire::Symbol) -> Result<SymbolInfo> {
    const SECTION: &str = "symbol";

    // 0 and absent both mean the producer did not know where the symbol ends
    let end_address = match raw.end_address {
        None | Some(0) => None,
        Some(address) => Some(address),
    };

    Ok(SymbolInfo {
        name: require_non_empty(raw.name, SECTION, "name")?,
        start_address: require(raw.start_address, SECTION, "start_address")?,
        end_address,
    })
}

fn build_register(raw: wire::RegisterValue) -> Result<RegisterInfo> {
    const SECTION: &str = "register";

    Ok(RegisterInfo {
        name: require(raw.name, SECTION, "name")?,
        value: require(raw.value, SECTION, "value")?,
    })
}

fn build_binary_image(raw: wire::BinaryImage) -> Result<BinaryImageInfo> {
    const SECTION: &str = "binary_image";

    let uuid = match raw.uuid {
        Some(uuid) => Some(uuid_from_bytes(&uuid, SECTION, "uuid")?),
        None => None,
    };
    let code_type = raw
        .code_type
        .map(|processor| build_processor(processor, "binary_image.code_type"))
        .transpose()?;

    Ok(BinaryImageInfo {
        name: require(raw.name, SECTION, "name")?,
        base_address: require(raw.base_address, SECTION, "base_address")?,
        size: require(raw.size, SECTION, "size")?,
        uuid,
        code_type,
    })
}

fn build_exception(raw: wire::Exception) -> Result<ExceptionInfo> {
    const SECTION: &str = "exception";

    let frames = raw
        .frames
        .into_iter()
        .map(build_stack_frame)
        .collect::<Result<Vec<_>>>()?;

    Ok(ExceptionInfo {
        name: require(raw.name, SECTION, "name")?,
        reason: require(raw.reason, SECTION, "reason")?,
        frames,
    })
}

fn convert_operating_system(value: i32) -> Result<OperatingSystem> {
    let os = wire::OperatingSystem::try_from(value).map_err(|_| {
        Error::invalid_field(
            "system_info",
            "operating_system",
            format!("unknown operating system value {value}"),
        )
    })?;

    Ok(match os {
        wire::OperatingSystem::MacOsX => OperatingSystem::MacOsX,
        wire::OperatingSystem::IphoneOs => OperatingSystem::IphoneOs,
        wire::OperatingSystem::IphoneSimulator => OperatingSystem::IphoneSimulator,
        wire::OperatingSystem::Unknown => OperatingSystem::Unknown,
        wire::OperatingSystem::AppleTvOs => OperatingSystem::AppleTvOs,
    })
}

fn convert_architecture(value: i32) -> Result<Architecture> {
    let architecture = wire::Architecture::try_from(value).map_err(|_| {
        Error::invalid_field(
            "system_info",
            "architecture",
            format!("unknown legacy architecture value {value}"),
        )
    })?;

    Ok(match architecture {
        wire::Architecture::X86 => Architecture::X86,
        wire::Architecture::Amd64 => Architecture::Amd64,
        wire::Architecture::Armv6 => Architecture::Armv6,
        wire::Architecture::Armv7 => Architecture::Armv7,
        wire::Architecture::Ppc => Architecture::Ppc,
        wire::Architecture::Ppc64 => Architecture::Ppc64,
    })
}

fn timestamp_from_secs(secs: i64, section: &'static str, field: &'static str) -> Result<SystemTime> {
    let secs = u64::try_from(secs).map_err(|_| {
        Error::invalid_field(section, field, format!("negative timestamp {secs}"))
    })?;
    Ok(UNIX_EPOCH + Duration::from_secs(secs))
}

fn uuid_from_bytes(bytes: &Bytes, section: &'static str, field: &'static str) -> Result<[u8; 16]> {
    let raw: &[u8] = bytes;
    raw.try_into().map_err(|_| {
        Error::invalid_field(
            section,
            field,
            format!("expected 16 bytes, found {}", bytes.len()),
        )
    })
}

fn require<T>(value: Option<T>, section: &'static str, field: &'static str) -> Result<T> {
    value.ok_or_else(|| Error::missing_field(section, field))
}

fn require_non_empty(
    value: Option<String>,
    section: &'static str,
    field: &'static str,
) -> Result<String> {
    let value = require(value, section, field)?;
    if value.is_empty() {
        return Err(Error::invalid_field(section, field, "must not be empty"));
    }
    Ok(value)
}
