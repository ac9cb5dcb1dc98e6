// Linux-specific helpers: cpufreq limits from sysfs.

/// Min/max frequency of cpu0 in MHz from `/sys/devices/system/cpu/cpu0/cpufreq` (values are kHz).
pub(super) fn read_cpu_freq_limits() -> Option<(f64, f64)> {
    #[cfg(target_os = "linux")]
    {
        let read_khz = |file: &str| -> Option<f64> {
            let path = format!("/sys/devices/system/cpu/cpu0/cpufreq/{}", file);
            std::fs::read_to_string(path)
                .ok()?
                .trim()
                .parse::<u64>()
                .ok()
                .map(|khz| khz as f64 / 1000.0)
        };
        let min = read_khz("cpuinfo_min_freq")?;
        let max = read_khz("cpuinfo_max_freq")?;
        Some((min, max))
    }
    #[cfg(not(target_os = "linux"))]
    None
}
