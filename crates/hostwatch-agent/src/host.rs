// SPDX-FileCopyrightText: 2026 Hostwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use hostwatch_core::HostInfo;
use sysinfo::System;

/// Host metadata for snapshots whose config carries no `Host` table.
pub fn local_host_info() -> HostInfo {
    let mut host = HostInfo {
        name: System::host_name().unwrap_or_else(|| "localhost".to_string()),
        ..HostInfo::default()
    };
    if let Some(kernel) = System::kernel_version() {
        host.data.insert("Kernel".into(), kernel.into());
    }
    if let Some(os) = System::long_os_version() {
        host.data.insert("OS".into(), os.into());
    }
    host
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_host_has_a_name() {
        assert!(!local_host_info().name.is_empty());
    }
}
