//! Wire-level schema messages for the crash-report payload.
//!
//! The artifact payload is a Protocol Buffers message tree; these structs
//! are the `prost` rendering of that schema and exist solely as the decode
//! target. Every scalar field is declared `optional` and every list
//! `repeated`, regardless of whether the data model requires it: the wire
//! layer reports raw field presence, and all required/optional enforcement
//! happens in the report builder. Keeping the two concerns separate means a
//! schema-valid payload always decodes into this layer, and every invariant
//! violation is reported with section/field context rather than as a generic
//! parse failure.
//!
//! Field numbers are part of the artifact contract and must never be reused
//! or renumbered.

/// Operating system family, as encoded on the wire
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub(crate) enum OperatingSystem {
    /// Desktop macOS / Mac OS X
    MacOsX = 0,
    /// iOS on device
    IphoneOs = 1,
    /// iOS under the simulator
    IphoneSimulator = 2,
    /// Producer could not determine the OS
    Unknown = 3,
    /// tvOS
    AppleTvOs = 4,
}

/// Legacy coarse architecture enumeration.
///
/// Values 0–4 date from the first format revision; `Armv7` was appended in a
/// later producer release, which is why it sorts after the PowerPC values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub(crate) enum Architecture {
    /// 32-bit x86
    X86 = 0,
    /// x86-64
    Amd64 = 1,
    /// ARMv6
    Armv6 = 2,
    /// 32-bit PowerPC
    Ppc = 3,
    /// 64-bit PowerPC
    Ppc64 = 4,
    /// ARMv7
    Armv7 = 5,
}

/// Encoding scheme of processor type/subtype values
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub(crate) enum TypeEncoding {
    /// Encoding not recorded
    Unknown = 0,
    /// Mach `cpu_type_t` / `cpu_subtype_t`
    Mach = 1,
}

/// Processor identity
#[derive(Clone, PartialEq, ::prost::Message)]
pub(crate) struct Processor {
    #[prost(enumeration = "TypeEncoding", optional, tag = "1")]
    pub(crate) encoding: Option<i32>,
    #[prost(uint64, optional, tag = "2")]
    pub(crate) cpu_type: Option<u64>,
    #[prost(uint64, optional, tag = "3")]
    pub(crate) cpu_subtype: Option<u64>,
}

/// Host operating system section
#[derive(Clone, PartialEq, ::prost::Message)]
pub(crate) struct SystemInfo {
    #[prost(enumeration = "OperatingSystem", optional, tag = "1")]
    pub(crate) operating_system: Option<i32>,
    #[prost(string, optional, tag = "2")]
    pub(crate) os_version: Option<String>,
    /// Legacy architecture value; superseded by `MachineInfo.processor` but
    /// still written by every producer version
    #[prost(enumeration = "Architecture", optional, tag = "3")]
    pub(crate) architecture: Option<i32>,
    /// UNIX timestamp of the crash; 0 when the clock was unreadable in the
    /// crash context
    #[prost(int64, optional, tag = "4")]
    pub(crate) timestamp: Option<i64>,
    #[prost(string, optional, tag = "5")]
    pub(crate) os_build: Option<String>,
}

/// Machine description section, written by newer producers only
#[derive(Clone, PartialEq, ::prost::Message)]
pub(crate) struct MachineInfo {
    #[prost(string, optional, tag = "1")]
    pub(crate) model: Option<String>,
    #[prost(message, optional, tag = "2")]
    pub(crate) processor: Option<Processor>,
    #[prost(uint32, optional, tag = "3")]
    pub(crate) processor_count: Option<u32>,
    #[prost(uint32, optional, tag = "4")]
    pub(crate) logical_processor_count: Option<u32>,
}

/// Application identity section
#[derive(Clone, PartialEq, ::prost::Message)]
pub(crate) struct ApplicationInfo {
    #[prost(string, optional, tag = "1")]
    pub(crate) identifier: Option<String>,
    #[prost(string, optional, tag = "2")]
    pub(crate) version: Option<String>,
    #[prost(string, optional, tag = "3")]
    pub(crate) marketing_version: Option<String>,
}

/// Process context section, absent in the oldest format revision
#[derive(Clone, PartialEq, ::prost::Message)]
pub(crate) struct ProcessInfo {
    #[prost(string, optional, tag = "1")]
    pub(crate) process_name: Option<String>,
    #[prost(uint32, optional, tag = "2")]
    pub(crate) process_id: Option<u32>,
    #[prost(string, optional, tag = "3")]
    pub(crate) process_path: Option<String>,
    #[prost(string, optional, tag = "4")]
    pub(crate) parent_process_name: Option<String>,
    #[prost(uint32, optional, tag = "5")]
    pub(crate) parent_process_id: Option<u32>,
    #[prost(bool, optional, tag = "6")]
    pub(crate) native: Option<bool>,
    /// UNIX timestamp of process start
    #[prost(int64, optional, tag = "7")]
    pub(crate) start_time: Option<i64>,
}

/// Resolved symbol for a stack frame
#[derive(Clone, PartialEq, ::prost::Message)]
pub(crate) struct Symbol {
    #[prost(string, optional, tag = "1")]
    pub(crate) name: Option<String>,
    #[prost(uint64, optional, tag = "2")]
    pub(crate) start_address: Option<u64>,
    /// End of the symbol's code; 0 or absent when unknown
    #[prost(uint64, optional, tag = "3")]
    pub(crate) end_address: Option<u64>,
}

/// One stack frame
#[derive(Clone, PartialEq, ::prost::Message)]
pub(crate) struct StackFrame {
    #[prost(uint64, optional, tag = "1")]
    pub(crate) pc: Option<u64>,
    #[prost(message, optional, tag = "2")]
    pub(crate) symbol: Option<Symbol>,
}

/// One register name/value pair
#[derive(Clone, PartialEq, ::prost::Message)]
pub(crate) struct RegisterValue {
    #[prost(string, optional, tag = "1")]
    pub(crate) name: Option<String>,
    #[prost(uint64, optional, tag = "2")]
    pub(crate) value: Option<u64>,
}

/// One captured thread
#[derive(Clone, PartialEq, ::prost::Message)]
pub(crate) struct Thread {
    #[prost(uint32, optional, tag = "1")]
    pub(crate) thread_number: Option<u32>,
    #[prost(message, repeated, tag = "2")]
    pub(crate) frames: Vec<StackFrame>,
    #[prost(bool, optional, tag = "3")]
    pub(crate) crashed: Option<bool>,
    #[prost(message, repeated, tag = "4")]
    pub(crate) registers: Vec<RegisterValue>,
}

/// One mapped binary image
#[derive(Clone, PartialEq, ::prost::Message)]
pub(crate) struct BinaryImage {
    #[prost(uint64, optional, tag = "1")]
    pub(crate) base_address: Option<u64>,
    #[prost(uint64, optional, tag = "2")]
    pub(crate) size: Option<u64>,
    #[prost(string, optional, tag = "3")]
    pub(crate) name: Option<String>,
    #[prost(bytes = "bytes", optional, tag = "4")]
    pub(crate) uuid: Option<::prost::bytes::Bytes>,
    #[prost(message, optional, tag = "5")]
    pub(crate) code_type: Option<Processor>,
}

/// Language-level exception section
#[derive(Clone, PartialEq, ::prost::Message)]
pub(crate) struct Exception {
    #[prost(string, optional, tag = "1")]
    pub(crate) name: Option<String>,
    #[prost(string, optional, tag = "2")]
    pub(crate) reason: Option<String>,
    #[prost(message, repeated, tag = "3")]
    pub(crate) frames: Vec<StackFrame>,
}

/// OS signal section
#[derive(Clone, PartialEq, ::prost::Message)]
pub(crate) struct Signal {
    #[prost(string, optional, tag = "1")]
    pub(crate) name: Option<String>,
    #[prost(string, optional, tag = "2")]
    pub(crate) code: Option<String>,
    #[prost(uint64, optional, tag = "3")]
    pub(crate) address: Option<u64>,
}

/// Kernel exception section
#[derive(Clone, PartialEq, ::prost::Message)]
pub(crate) struct MachException {
    #[prost(uint64, optional, tag = "1")]
    pub(crate) exception_type: Option<u64>,
    #[prost(uint64, repeated, tag = "2")]
    pub(crate) codes: Vec<u64>,
}

/// Report-level metadata section
#[derive(Clone, PartialEq, ::prost::Message)]
pub(crate) struct ReportInfo {
    #[prost(bytes = "bytes", optional, tag = "1")]
    pub(crate) uuid: Option<::prost::bytes::Bytes>,
}

/// Root message of the artifact payload
#[derive(Clone, PartialEq, ::prost::Message)]
pub(crate) struct CrashReport {
    #[prost(message, optional, tag = "1")]
    pub(crate) system_info: Option<SystemInfo>,
    #[prost(message, optional, tag = "2")]
    pub(crate) application_info: Option<ApplicationInfo>,
    #[prost(message, repeated, tag = "3")]
    pub(crate) threads: Vec<Thread>,
    #[prost(message, repeated, tag = "4")]
    pub(crate) binary_images: Vec<BinaryImage>,
    #[prost(message, optional, tag = "5")]
    pub(crate) exception: Option<Exception>,
    #[prost(message, optional, tag = "6")]
    pub(crate) signal: Option<Signal>,
    #[prost(message, optional, tag = "7")]
    pub(crate) process_info: Option<ProcessInfo>,
    #[prost(message, optional, tag = "8")]
    pub(crate) machine_info: Option<MachineInfo>,
    #[prost(message, optional, tag = "9")]
    pub(crate) report_info: Option<ReportInfo>,
    #[prost(message, optional, tag = "10")]
    pub(crate) mach_exception: Option<MachException>,
}
