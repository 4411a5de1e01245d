//! Typed crash-report object model.
//!
//! This module defines the immutable entity tree produced by a successful
//! decode. The tree is built bottom-up by the decoder and frozen afterwards:
//! fields are crate-private and every entity exposes read-only accessors, so
//! a [`CrashReport`] can be shared freely across threads once returned.
//!
//! ## Normalization
//!
//! Older artifacts carry only a coarse legacy [`Architecture`] value instead
//! of a dedicated processor section. The decoder normalizes this away using
//! [`Architecture::legacy_processor_info`], so [`SystemInfo::processor_info`]
//! is populated for every producer version and callers never special-case
//! artifact age.

use std::time::SystemTime;

/// Mach CPU type and subtype constants used when synthesizing processor
/// information from a legacy architecture value.
///
/// These are the producer platform's fixed ABI numbers; they are part of the
/// artifact contract and must not drift.
mod mach {
    /// 64-bit ABI flag, OR-ed into the base CPU type
    pub(crate) const CPU_ARCH_ABI64: u64 = 0x0100_0000;

    pub(crate) const CPU_TYPE_X86: u64 = 7;
    pub(crate) const CPU_TYPE_X86_64: u64 = CPU_TYPE_X86 | CPU_ARCH_ABI64;
    pub(crate) const CPU_TYPE_ARM: u64 = 12;
    pub(crate) const CPU_TYPE_POWERPC: u64 = 18;
    pub(crate) const CPU_TYPE_POWERPC64: u64 = CPU_TYPE_POWERPC | CPU_ARCH_ABI64;

    pub(crate) const CPU_SUBTYPE_X86_ALL: u64 = 3;
    pub(crate) const CPU_SUBTYPE_X86_64_ALL: u64 = 3;
    pub(crate) const CPU_SUBTYPE_POWERPC_ALL: u64 = 0;
    pub(crate) const CPU_SUBTYPE_ARM_V6: u64 = 6;
    pub(crate) const CPU_SUBTYPE_ARM_V7: u64 = 9;
}

/// Operating system the crashed process was running on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatingSystem {
    /// Desktop macOS / Mac OS X
    MacOsX,
    /// iOS on device
    IphoneOs,
    /// iOS running under the simulator
    IphoneSimulator,
    /// tvOS
    AppleTvOs,
    /// Producer could not determine the host OS
    Unknown,
}

/// Legacy coarse CPU-family enumeration.
///
/// Retained in the artifact for backward compatibility; superseded by the
/// explicit processor section in newer producer versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Architecture {
    /// 32-bit x86
    X86,
    /// 64-bit x86 (x86-64)
    Amd64,
    /// ARMv6
    Armv6,
    /// ARMv7
    Armv7,
    /// 32-bit PowerPC
    Ppc,
    /// 64-bit PowerPC
    Ppc64,
}

impl Architecture {
    /// Synthesizes the processor information implied by this legacy value.
    ///
    /// The mapping is fixed and exhaustive over the closed enum, so every
    /// decoded report exposes a [`ProcessorInfo`] even when the artifact
    /// predates the dedicated processor section.
    pub fn legacy_processor_info(self) -> ProcessorInfo {
        let (cpu_type, cpu_subtype) = match self {
            Self::X86 => (mach::CPU_TYPE_X86, mach::CPU_SUBTYPE_X86_ALL),
            Self::Amd64 => (mach::CPU_TYPE_X86_64, mach::CPU_SUBTYPE_X86_64_ALL),
            Self::Armv6 => (mach::CPU_TYPE_ARM, mach::CPU_SUBTYPE_ARM_V6),
            Self::Armv7 => (mach::CPU_TYPE_ARM, mach::CPU_SUBTYPE_ARM_V7),
            Self::Ppc => (mach::CPU_TYPE_POWERPC, mach::CPU_SUBTYPE_POWERPC_ALL),
            Self::Ppc64 => (mach::CPU_TYPE_POWERPC64, mach::CPU_SUBTYPE_POWERPC_ALL),
        };

        ProcessorInfo {
            type_encoding: TypeEncoding::Mach,
            cpu_type,
            cpu_subtype,
        }
    }
}

/// Encoding scheme of the numeric CPU type/subtype pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeEncoding {
    /// Encoding was not recorded by the producer
    Unknown,
    /// Mach `cpu_type_t` / `cpu_subtype_t` values
    Mach,
}

/// CPU identity of the host or of a binary image's code.
///
/// Shared value type with no identity of its own; cheap to copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProcessorInfo {
    pub(crate) type_encoding: TypeEncoding,
    pub(crate) cpu_type: u64,
    pub(crate) cpu_subtype: u64,
}

impl ProcessorInfo {
    /// Encoding scheme of the type/subtype values
    pub fn type_encoding(&self) -> TypeEncoding {
        self.type_encoding
    }

    /// Numeric CPU type
    pub fn cpu_type(&self) -> u64 {
        self.cpu_type
    }

    /// Numeric CPU subtype
    pub fn cpu_subtype(&self) -> u64 {
        self.cpu_subtype
    }
}

/// Host operating system state at crash time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemInfo {
    pub(crate) operating_system: OperatingSystem,
    pub(crate) os_version: String,
    pub(crate) os_build: Option<String>,
    pub(crate) architecture: Architecture,
    pub(crate) processor_info: ProcessorInfo,
    pub(crate) timestamp: Option<SystemTime>,
}

impl SystemInfo {
    /// Operating system family
    pub fn operating_system(&self) -> OperatingSystem {
        self.operating_system
    }

    /// OS version string, e.g. `"13.2.1"`
    pub fn os_version(&self) -> &str {
        &self.os_version
    }

    /// OS build identifier, if the producer recorded one
    pub fn os_build(&self) -> Option<&str> {
        self.os_build.as_deref()
    }

    /// Legacy architecture value carried by the artifact
    pub fn architecture(&self) -> Architecture {
        self.architecture
    }

    /// Host processor identity.
    ///
    /// Decoded from the machine-info section when present, otherwise
    /// synthesized from [`Self::architecture`]. Always populated.
    pub fn processor_info(&self) -> ProcessorInfo {
        self.processor_info
    }

    /// Wall-clock time of the crash, if the producer could read the clock
    pub fn timestamp(&self) -> Option<SystemTime> {
        self.timestamp
    }
}

/// Physical or virtual machine the process was running on.
///
/// Only present in artifacts from newer producer versions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineInfo {
    pub(crate) model: Option<String>,
    pub(crate) processor_info: Option<ProcessorInfo>,
    pub(crate) processor_count: u32,
    pub(crate) logical_processor_count: u32,
}

impl MachineInfo {
    /// Hardware model identifier, e.g. `"MacBookPro18,3"`
    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    /// Host processor identity as recorded in this section
    pub fn processor_info(&self) -> Option<ProcessorInfo> {
        self.processor_info
    }

    /// Number of physical processor cores
    pub fn processor_count(&self) -> u32 {
        self.processor_count
    }

    /// Number of logical processor cores
    pub fn logical_processor_count(&self) -> u32 {
        self.logical_processor_count
    }
}

/// Identity of the crashed application
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationInfo {
    pub(crate) identifier: String,
    pub(crate) version: String,
    pub(crate) marketing_version: Option<String>,
}

impl ApplicationInfo {
    /// Application identifier, e.g. a reverse-DNS bundle identifier
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Application build version
    pub fn version(&self) -> &str {
        &self.version
    }

    /// User-facing marketing version, if distinct from the build version
    pub fn marketing_version(&self) -> Option<&str> {
        self.marketing_version.as_deref()
    }
}

/// OS process context of the crashed process.
///
/// Absent entirely in artifacts from the oldest producer version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInfo {
    pub(crate) process_name: Option<String>,
    pub(crate) process_path: Option<String>,
    pub(crate) process_id: u32,
    pub(crate) start_time: Option<SystemTime>,
    pub(crate) parent_process_name: Option<String>,
    pub(crate) parent_process_id: u32,
    pub(crate) native: bool,
}

impl ProcessInfo {
    /// Process name
    pub fn process_name(&self) -> Option<&str> {
        self.process_name.as_deref()
    }

    /// Filesystem path of the process executable
    pub fn process_path(&self) -> Option<&str> {
        self.process_path.as_deref()
    }

    /// Process id
    pub fn process_id(&self) -> u32 {
        self.process_id
    }

    /// Process start time
    pub fn start_time(&self) -> Option<SystemTime> {
        self.start_time
    }

    /// Parent process name
    pub fn parent_process_name(&self) -> Option<&str> {
        self.parent_process_name.as_deref()
    }

    /// Parent process id
    pub fn parent_process_id(&self) -> u32 {
        self.parent_process_id
    }

    /// Whether the process executed natively on the host architecture
    /// (false under binary translation)
    pub fn native(&self) -> bool {
        self.native
    }
}

/// Resolved symbol for a stack frame's instruction pointer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolInfo {
    pub(crate) name: String,
    pub(crate) start_address: u64,
    pub(crate) end_address: Option<u64>,
}

impl SymbolInfo {
    /// Symbol name; never empty
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Address at which the symbol's code begins
    pub fn start_address(&self) -> u64 {
        self.start_address
    }

    /// Address at which the symbol's code ends, when the producer knew it
    pub fn end_address(&self) -> Option<u64> {
        self.end_address
    }
}

/// One captured stack frame.
///
/// Frame order within a thread is call order: frame 0 is the innermost
/// frame, i.e. the point of execution at crash time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackFrameInfo {
    pub(crate) instruction_pointer: u64,
    pub(crate) symbol: Option<SymbolInfo>,
}

impl StackFrameInfo {
    /// Instruction-pointer address of this frame
    pub fn instruction_pointer(&self) -> u64 {
        self.instruction_pointer
    }

    /// Symbol the instruction pointer resolved to, if the producer had one
    pub fn symbol(&self) -> Option<&SymbolInfo> {
        self.symbol.as_ref()
    }
}

/// Snapshot of a single CPU register
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterInfo {
    pub(crate) name: String,
    pub(crate) value: u64,
}

impl RegisterInfo {
    /// Register name, e.g. `"rip"`
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw register value
    pub fn value(&self) -> u64 {
        self.value
    }
}

/// One captured thread with its stack and register state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadInfo {
    pub(crate) thread_number: u32,
    pub(crate) frames: Vec<StackFrameInfo>,
    pub(crate) crashed: bool,
    pub(crate) registers: Vec<RegisterInfo>,
}

impl ThreadInfo {
    /// Thread number assigned by the producer.
    ///
    /// Thread 0 is not necessarily the crashing thread; use
    /// [`Self::crashed`] to identify it.
    pub fn thread_number(&self) -> u32 {
        self.thread_number
    }

    /// Stack frames in call order; frame 0 is innermost
    pub fn frames(&self) -> &[StackFrameInfo] {
        &self.frames
    }

    /// Whether this is the thread that caused the crash
    pub fn crashed(&self) -> bool {
        self.crashed
    }

    /// Register snapshots in artifact order
    pub fn registers(&self) -> &[RegisterInfo] {
        &self.registers
    }
}

/// One binary image mapped into the crashed process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryImageInfo {
    pub(crate) name: String,
    pub(crate) base_address: u64,
    pub(crate) size: u64,
    pub(crate) uuid: Option<[u8; 16]>,
    pub(crate) code_type: Option<ProcessorInfo>,
}

impl BinaryImageInfo {
    /// Image name, typically the load path
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Address the image is mapped at
    pub fn base_address(&self) -> u64 {
        self.base_address
    }

    /// Mapped size in bytes
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Image UUID, if the producer recorded one
    pub fn uuid(&self) -> Option<&[u8; 16]> {
        self.uuid.as_ref()
    }

    /// Processor type the image's code was built for
    pub fn code_type(&self) -> Option<ProcessorInfo> {
        self.code_type
    }

    /// Returns true if `address` lies within this image's mapped range
    /// `[base, base + size)`.
    pub fn contains(&self, address: u64) -> bool {
        match address.checked_sub(self.base_address) {
            Some(offset) => offset < self.size,
            None => false,
        }
    }
}

/// Language-level exception that led to the crash, if one was involved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionInfo {
    pub(crate) name: String,
    pub(crate) reason: String,
    pub(crate) frames: Vec<StackFrameInfo>,
}

impl ExceptionInfo {
    /// Exception name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Human-readable exception reason
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Stack frames at the exception's throw point, when captured.
    ///
    /// Empty when the producer did not record a throw-site stack.
    pub fn frames(&self) -> &[StackFrameInfo] {
        &self.frames
    }
}

/// OS signal that terminated the process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalInfo {
    pub(crate) name: String,
    pub(crate) code: String,
    pub(crate) address: u64,
}

impl SignalInfo {
    /// Signal name, e.g. `"SIGSEGV"`
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Signal code, e.g. `"SEGV_MAPERR"`
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Faulting address
    pub fn address(&self) -> u64 {
        self.address
    }
}

/// Kernel-level exception detail, present only for kernel-raised crashes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachExceptionInfo {
    pub(crate) exception_type: u64,
    pub(crate) codes: Vec<u64>,
}

impl MachExceptionInfo {
    /// Kernel exception type code
    pub fn exception_type(&self) -> u64 {
        self.exception_type
    }

    /// Exception-specific codes; never more than 255 entries
    pub fn codes(&self) -> &[u64] {
        &self.codes
    }
}

/// A fully decoded and validated crash report.
///
/// Root of the immutable entity tree returned by
/// [`decode`](crate::decoder::decode). Owns all children exclusively; no
/// further mutation occurs after construction, so a report may be shared
/// across threads for concurrent read access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrashReport {
    pub(crate) report_uuid: Option<[u8; 16]>,
    pub(crate) system_info: SystemInfo,
    pub(crate) machine_info: Option<MachineInfo>,
    pub(crate) application_info: ApplicationInfo,
    pub(crate) process_info: Option<ProcessInfo>,
    pub(crate) signal_info: SignalInfo,
    pub(crate) mach_exception_info: Option<MachExceptionInfo>,
    pub(crate) threads: Vec<ThreadInfo>,
    pub(crate) binary_images: Vec<BinaryImageInfo>,
    pub(crate) exception_info: Option<ExceptionInfo>,
}

impl CrashReport {
    /// UUID assigned to this report by the producer
    pub fn report_uuid(&self) -> Option<&[u8; 16]> {
        self.report_uuid.as_ref()
    }

    /// Host OS state at crash time
    pub fn system_info(&self) -> &SystemInfo {
        &self.system_info
    }

    /// Machine description, present in newer artifacts
    pub fn machine_info(&self) -> Option<&MachineInfo> {
        self.machine_info.as_ref()
    }

    /// Identity of the crashed application
    pub fn application_info(&self) -> &ApplicationInfo {
        &self.application_info
    }

    /// OS process context, absent in the oldest artifacts
    pub fn process_info(&self) -> Option<&ProcessInfo> {
        self.process_info.as_ref()
    }

    /// Signal that terminated the process
    pub fn signal_info(&self) -> &SignalInfo {
        &self.signal_info
    }

    /// Kernel exception detail, if the crash was kernel-raised
    pub fn mach_exception_info(&self) -> Option<&MachExceptionInfo> {
        self.mach_exception_info.as_ref()
    }

    /// Captured threads in artifact order; never empty
    pub fn threads(&self) -> &[ThreadInfo] {
        &self.threads
    }

    /// Mapped binary images in artifact order; never empty
    pub fn binary_images(&self) -> &[BinaryImageInfo] {
        &self.binary_images
    }

    /// Language-level exception, if one was involved in the crash
    pub fn exception_info(&self) -> Option<&ExceptionInfo> {
        self.exception_info.as_ref()
    }

    /// Whether the artifact carried a machine-info section
    pub fn has_machine_info(&self) -> bool {
        self.machine_info.is_some()
    }

    /// Whether the artifact carried a process-info section
    pub fn has_process_info(&self) -> bool {
        self.process_info.is_some()
    }

    /// Whether the artifact carried a language-level exception section
    pub fn has_exception_info(&self) -> bool {
        self.exception_info.is_some()
    }

    /// Whether the artifact carried kernel exception detail
    pub fn has_mach_exception_info(&self) -> bool {
        self.mach_exception_info.is_some()
    }

    /// Whether the artifact carried a report UUID
    pub fn has_report_uuid(&self) -> bool {
        self.report_uuid.is_some()
    }

    /// Returns the first thread flagged as crashed, if any
    pub fn crashed_thread(&self) -> Option<&ThreadInfo> {
        self.threads.iter().find(|thread| thread.crashed)
    }

    /// Returns the image whose mapped range `[base, base + size)` contains
    /// `address`, or `None`.
    ///
    /// Linear scan over the image list; if ranges ever overlap (producers
    /// are not supposed to emit that), the first matching image in artifact
    /// order wins.
    pub fn find_image(&self, address: u64) -> Option<&BinaryImageInfo> {
        self.binary_images.iter().find(|image| image.contains(address))
    }
}
