use serde::{Deserialize, Serialize};
use sysinfo::{Components, Disks, System};

/// Point-in-time view of the host, shown by the status screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentSnapshot {
    pub kernel: String,
    pub uptime_seconds: u64,
    pub load_average: (f64, f64, f64),
    pub memory_used_bytes: u64,
    pub memory_total_bytes: u64,
    pub root_disk: Option<DiskUsage>,
    /// Celsius, from the CPU package sensor when the host exposes one.
    pub cpu_temperature: Option<f32>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiskUsage {
    pub used_bytes: u64,
    pub total_bytes: u64,
}

impl DiskUsage {
    pub fn percent_used(&self) -> u64 {
        if self.total_bytes == 0 {
            return 0;
        }
        self.used_bytes * 100 / self.total_bytes
    }
}

impl EnvironmentSnapshot {
    pub fn capture() -> Self {
        let mut sys = System::new();
        sys.refresh_memory();

        let disks = Disks::new_with_refreshed_list();
        let root_disk = disks
            .iter()
            .find(|disk| disk.mount_point() == std::path::Path::new("/"))
            .map(|disk| DiskUsage {
                used_bytes: disk.total_space().saturating_sub(disk.available_space()),
                total_bytes: disk.total_space(),
            });

        let load = System::load_average();

        let components = Components::new_with_refreshed_list();
        let cpu_temperature = cpu_temperature(
            components
                .iter()
                .map(|c| (c.label(), c.temperature())),
        );

        Self {
            kernel: System::kernel_version().unwrap_or_else(|| "unknown".to_string()),
            uptime_seconds: System::uptime(),
            load_average: (load.one, load.five, load.fifteen),
            memory_used_bytes: sys.used_memory(),
            memory_total_bytes: sys.total_memory(),
            root_disk,
            cpu_temperature,
        }
    }

    /// Label/value pairs in display order.
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        let (one, five, fifteen) = self.load_average;
        vec![
            ("Kernel", self.kernel.clone()),
            ("Uptime", format_uptime(self.uptime_seconds)),
            ("Load Average", format!("{:.2} {:.2} {:.2}", one, five, fifteen)),
            (
                "Memory Usage",
                format!(
                    "{} / {}",
                    human_bytes(self.memory_used_bytes),
                    human_bytes(self.memory_total_bytes)
                ),
            ),
            (
                "Root Disk Usage",
                self.root_disk
                    .map(|d| {
                        format!(
                            "{} / {} ({}%)",
                            human_bytes(d.used_bytes),
                            human_bytes(d.total_bytes),
                            d.percent_used()
                        )
                    })
                    .unwrap_or_else(|| "N/A".to_string()),
            ),
            (
                "CPU Temperature",
                self.cpu_temperature
                    .map(|t| format!("+{:.1}°C", t))
                    .unwrap_or_else(|| "N/A".to_string()),
            ),
        ]
    }
}

/// Picks the CPU reading from `(label, celsius)` sensor pairs: the Intel
/// package sensor, then the AMD control sensor, then any CPU or core label.
pub fn cpu_temperature<'a, I>(readings: I) -> Option<f32>
where
    I: IntoIterator<Item = (&'a str, f32)>,
{
    let readings: Vec<(String, f32)> = readings
        .into_iter()
        .filter(|(_, t)| t.is_finite() && *t > 0.0)
        .map(|(label, t)| (label.to_lowercase(), t))
        .collect();

    ["package id 0", "tctl", "cpu", "core"]
        .iter()
        .find_map(|needle| readings.iter().find(|(label, _)| label.contains(needle)))
        .map(|(_, t)| *t)
}

/// Same shape as `uptime -p`: "up 2 days, 3 hours, 4 minutes".
pub fn format_uptime(seconds: u64) -> String {
    let days = seconds / 86_400;
    let hours = (seconds % 86_400) / 3_600;
    let minutes = (seconds % 3_600) / 60;

    let mut parts = Vec::new();
    for (value, unit) in [(days, "day"), (hours, "hour"), (minutes, "minute")] {
        if value > 0 {
            let plural = if value == 1 { "" } else { "s" };
            parts.push(format!("{} {}{}", value, unit, plural));
        }
    }
    if parts.is_empty() {
        return "up 0 minutes".to_string();
    }
    format!("up {}", parts.join(", "))
}

pub fn human_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "Ki", "Mi", "Gi", "Ti"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{}{}", bytes, UNITS[0])
    } else {
        format!("{:.1}{}", value, UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_capture() {
        let snapshot = EnvironmentSnapshot::capture();
        assert!(snapshot.memory_total_bytes > 0);
        assert!(!snapshot.kernel.is_empty());
        assert_eq!(snapshot.rows().len(), 6);
    }

    fn snapshot_without_sensors() -> EnvironmentSnapshot {
        EnvironmentSnapshot {
            kernel: "6.6.1-arch1-1".to_string(),
            uptime_seconds: 60,
            load_average: (0.5, 0.25, 0.1),
            memory_used_bytes: 1024,
            memory_total_bytes: 4096,
            root_disk: None,
            cpu_temperature: None,
        }
    }

    #[test]
    fn test_missing_sensor_renders_na() {
        let rows = snapshot_without_sensors().rows();
        assert_eq!(rows[5], ("CPU Temperature", "N/A".to_string()));
        assert_eq!(rows[4], ("Root Disk Usage", "N/A".to_string()));
    }

    #[test]
    fn test_cpu_temperature_row() {
        let snapshot = EnvironmentSnapshot {
            cpu_temperature: Some(45.0),
            ..snapshot_without_sensors()
        };
        assert_eq!(snapshot.rows()[5].1, "+45.0°C");
    }

    #[test]
    fn test_cpu_sensor_selection() {
        let intel = [
            ("acpitz temp1", 27.8),
            ("coretemp Core 0", 41.0),
            ("coretemp Package id 0", 44.0),
        ];
        assert_eq!(cpu_temperature(intel), Some(44.0));

        let amd = [("nvme Composite", 38.9), ("k10temp Tctl", 52.5)];
        assert_eq!(cpu_temperature(amd), Some(52.5));

        assert_eq!(cpu_temperature([("coretemp Core 1", 40.0)]), Some(40.0));
        assert_eq!(cpu_temperature([("nvme Composite", 38.9)]), None);
        assert_eq!(cpu_temperature([("k10temp Tctl", f32::NAN)]), None);
        assert_eq!(cpu_temperature(std::iter::empty()), None);
    }

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(0), "up 0 minutes");
        assert_eq!(format_uptime(60), "up 1 minute");
        assert_eq!(format_uptime(93_784), "up 1 day, 2 hours, 3 minutes");
        assert_eq!(format_uptime(7_200), "up 2 hours");
    }

    #[test]
    fn test_human_bytes() {
        assert_eq!(human_bytes(512), "512B");
        assert_eq!(human_bytes(1536), "1.5Ki");
        assert_eq!(human_bytes(8 * 1024 * 1024 * 1024), "8.0Gi");
    }

    #[test]
    fn test_disk_percent() {
        let disk = DiskUsage {
            used_bytes: 45,
            total_bytes: 50,
        };
        assert_eq!(disk.percent_used(), 90);
        assert_eq!(DiskUsage { used_bytes: 0, total_bytes: 0 }.percent_used(), 0);
    }
}
