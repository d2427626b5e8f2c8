//! Whitespace-level parsing of command output.

use crate::types::{DiskHealth, DiskLevel, PackageHit, ServiceSummary};

/// Packages whose pending update counts as a security concern.
pub const CRITICAL_PACKAGES: &[&str] = &["linux", "systemd", "glibc", "openssl"];

/// "85%" -> 85
pub fn parse_percent(field: &str) -> Option<u32> {
    field.trim().trim_end_matches('%').parse().ok()
}

pub fn count_lines(text: &str) -> usize {
    text.lines().filter(|l| !l.trim().is_empty()).count()
}

/// Use% of the first data row of `df` output.
pub fn df_use_percent(output: &str) -> Option<u32> {
    let row = output.lines().nth(1)?;
    let fields: Vec<&str> = row.split_whitespace().collect();
    fields.get(4).and_then(|f| parse_percent(f))
}

/// (total, used) from the `Mem:` row of `free` output.
pub fn free_memory(output: &str) -> Option<(u64, u64)> {
    let row = output.lines().nth(1)?;
    let fields: Vec<&str> = row.split_whitespace().collect();
    let total = fields.get(1)?.parse().ok()?;
    let used = fields.get(2)?.parse().ok()?;
    Some((total, used))
}

pub fn disk_level(use_percent: u32) -> DiskLevel {
    if use_percent > 90 {
        DiskLevel::Critical
    } else if use_percent > 80 {
        DiskLevel::Warning
    } else {
        DiskLevel::Ok
    }
}

/// One entry per mounted filesystem in `df -h` output.
pub fn disk_health(output: &str) -> Vec<DiskHealth> {
    output
        .lines()
        .skip(1)
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < 6 {
                return None;
            }
            let use_percent = parse_percent(fields[4])?;
            Some(DiskHealth {
                mount: fields[5].to_string(),
                use_percent,
                level: disk_level(use_percent),
            })
        })
        .collect()
}

pub fn summarize_services(output: &str) -> ServiceSummary {
    let mut summary = ServiceSummary::default();
    for line in output.lines() {
        if line.contains("active") && line.contains("running") {
            summary.active += 1;
        } else if line.contains("failed") {
            summary.failed += 1;
        } else if line.contains("inactive") {
            summary.inactive += 1;
        }
    }
    summary
}

/// Package names from `pacman -Qu` lines ("name old -> new").
pub fn update_names(output: &str) -> Vec<&str> {
    output
        .lines()
        .filter_map(|line| line.split_whitespace().next())
        .collect()
}

pub fn critical_updates(output: &str) -> Vec<&str> {
    update_names(output)
        .into_iter()
        .filter(|name| CRITICAL_PACKAGES.contains(name))
        .collect()
}

/// Header lines of `pacman -Ss` output paired with their indented
/// description lines.
pub fn search_hits(output: &str) -> Vec<PackageHit> {
    let mut hits: Vec<PackageHit> = Vec::new();
    for line in output.lines() {
        if line.trim().is_empty() {
            continue;
        }
        if line.starts_with(char::is_whitespace) {
            if let Some(hit) = hits.last_mut() {
                if !hit.description.is_empty() {
                    hit.description.push(' ');
                }
                hit.description.push_str(line.trim());
            }
            continue;
        }
        let mut fields = line.split_whitespace();
        let Some(name) = fields.next() else {
            continue;
        };
        hits.push(PackageHit {
            name: name.to_string(),
            version: fields.next().unwrap_or_default().to_string(),
            installed: line.contains("[installed"),
            description: String::new(),
        });
    }
    hits
}

/// Numeric release padded to `major.minor.patch`, then the remaining
/// `.`/`-` separated tags.
fn kernel_parts(version: &str) -> (Vec<u64>, Vec<&str>) {
    let mut fields = version
        .trim()
        .split(['.', '-'])
        .filter(|f| !f.is_empty())
        .peekable();

    let mut release = Vec::new();
    while let Some(n) = fields.peek().and_then(|f| f.parse::<u64>().ok()) {
        release.push(n);
        fields.next();
    }
    if release.len() < 3 {
        release.resize(3, 0);
    }
    (release, fields.collect())
}

/// Kernel versions compare equal when they differ only in `.`/`-`
/// separators or a dropped `.0` patch level, so `6.6.1-arch1-1` (uname)
/// matches `6.6.1.arch1-1` (pacman) and `6.7.0-arch3-1` matches `6.7.arch3-1`.
pub fn same_kernel(running: &str, installed: &str) -> bool {
    !running.trim().is_empty() && kernel_parts(running) == kernel_parts(installed)
}

/// Version field of `pacman -Q <pkg>` output.
pub fn installed_version(output: &str) -> Option<&str> {
    output.split_whitespace().nth(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DF_ROOT: &str = "\
Filesystem      Size  Used Avail Use% Mounted on
/dev/nvme0n1p2  468G  412G   33G  93% /
";

    const DF_ALL: &str = "\
Filesystem      Size  Used Avail Use% Mounted on
/dev/nvme0n1p2  468G  412G   33G  93% /
/dev/nvme0n1p1  511M  150M  362M  30% /boot
/dev/sda1       1.8T  1.5T  300G  84% /data
";

    const FREE: &str = "\
               total        used        free      shared  buff/cache   available
Mem:        16303764     5123456     8000000      400000     3180308    10800000
Swap:        8388604           0     8388604
";

    #[test]
    fn test_df_use_percent() {
        assert_eq!(df_use_percent(DF_ROOT), Some(93));
        assert_eq!(df_use_percent("header only\n"), None);
    }

    #[test]
    fn test_disk_health_levels() {
        let disks = disk_health(DF_ALL);
        assert_eq!(disks.len(), 3);
        assert_eq!(disks[0].level, DiskLevel::Critical);
        assert_eq!(disks[1].level, DiskLevel::Ok);
        assert_eq!(disks[2].level, DiskLevel::Warning);
        assert_eq!(disks[2].mount, "/data");
    }

    #[test]
    fn test_disk_level_boundaries() {
        assert_eq!(disk_level(80), DiskLevel::Ok);
        assert_eq!(disk_level(81), DiskLevel::Warning);
        assert_eq!(disk_level(90), DiskLevel::Warning);
        assert_eq!(disk_level(91), DiskLevel::Critical);
    }

    #[test]
    fn test_free_memory() {
        assert_eq!(free_memory(FREE), Some((16303764, 5123456)));
        assert_eq!(free_memory(""), None);
    }

    #[test]
    fn test_summarize_services() {
        let output = "\
  dbus.service          loaded active   running D-Bus System Message Bus
  cups.service          loaded failed   failed  CUPS Scheduler
  bluetooth.service     loaded inactive dead    Bluetooth service
  sshd.service          loaded active   running OpenSSH Daemon
";
        assert_eq!(
            summarize_services(output),
            ServiceSummary {
                active: 2,
                failed: 1,
                inactive: 1
            }
        );
    }

    #[test]
    fn test_critical_updates_match_whole_names() {
        let output = "linux-firmware 1 -> 2\nutil-linux 2.39 -> 2.40\nfirefox 1 -> 2\n";
        assert!(critical_updates(output).is_empty());

        let output = "openssl 3.1 -> 3.2\nlinux 6.6.1.arch1-1 -> 6.6.2.arch1-1\n";
        assert_eq!(critical_updates(output), vec!["openssl", "linux"]);
    }

    #[test]
    fn test_search_hits() {
        let output = "\
extra/firefox 121.0-1 [installed]
    Fast, Private & Safe Web Browser
extra/firefox-developer-edition 122.0b2-1
    Developer Edition of the popular Firefox web browser
";
        let hits = search_hits(output);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].name, "extra/firefox");
        assert_eq!(hits[0].version, "121.0-1");
        assert!(hits[0].installed);
        assert_eq!(hits[0].description, "Fast, Private & Safe Web Browser");
        assert!(!hits[1].installed);
    }

    #[test]
    fn test_same_kernel() {
        assert!(same_kernel("6.6.1-arch1-1\n", "6.6.1.arch1-1"));
        assert!(!same_kernel("6.6.1-arch1-1", "6.6.2.arch1-1"));
        assert!(!same_kernel("", ""));
    }

    #[test]
    fn test_same_kernel_with_zero_patch_level() {
        assert!(same_kernel("6.7.0-arch3-1", "6.7.arch3-1"));
        assert!(same_kernel("6.7-arch3-1", "6.7.0.arch3-1"));
        assert!(!same_kernel("6.7.0-arch3-1", "6.7.1.arch1-1"));
        assert!(!same_kernel("6.7.0-arch3-1", "6.7.arch4-1"));
        assert_eq!(installed_version("linux 6.6.1.arch1-1\n"), Some("6.6.1.arch1-1"));
    }

    #[test]
    fn test_percent_and_counts() {
        assert_eq!(parse_percent(" 42% "), Some(42));
        assert_eq!(parse_percent("n/a"), None);
        assert_eq!(count_lines("a\n\n b\n"), 2);
    }
}
