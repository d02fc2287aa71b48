//! Frequency bands to spectrum bin ranges
//!
//! K target frequencies produce K+1 consecutive half-open ranges: one
//! ending at each frequency's bin boundary, plus a trailing range up to
//! the end of the spectrum.

use log::warn;

/// Magnitude reported for a band with no energy (or no bins at all)
pub const SILENCE_MAGNITUDE: f64 = 1.0;

/// Half-open bin interval [start, end) into a spectrum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BandRange {
    pub start: usize,
    pub end: usize,
}

impl BandRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Number of bins covered (zero for collapsed or inverted ranges)
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Bin boundary for one frequency, rounding half up
///
/// The fractional index `chunk_size * frequency / sample_rate` rounds up
/// when its fractional part is at least 0.5 and truncates otherwise.
pub fn frequency_to_bin(frequency: f64, sample_rate: u32, chunk_size: usize) -> usize {
    let fractional_index = chunk_size as f64 * frequency / sample_rate as f64;
    if fractional_index <= 0.0 || !fractional_index.is_finite() {
        return 0;
    }

    let whole = fractional_index.trunc();
    if fractional_index - whole >= 0.5 {
        whole as usize + 1
    } else {
        whole as usize
    }
}

/// Compute the ranges for a band definition
///
/// # Arguments
/// * `frequencies` - Target frequencies in Hz, conventionally increasing
/// * `sample_rate` - Sample rate in Hz
/// * `chunk_size` - Samples per chunk; the spectrum has `chunk_size / 2` bins
///
/// # Returns
/// `frequencies.len() + 1` ranges. Frequencies above Nyquist are reported
/// but still mapped, so their boundary may lie past the spectrum end.
pub fn compute_band_ranges(frequencies: &[f64], sample_rate: u32, chunk_size: usize) -> Vec<BandRange> {
    let nyquist = sample_rate as f64 / 2.0;
    let spectrum_len = chunk_size / 2;

    let boundaries: Vec<usize> = frequencies
        .iter()
        .map(|&f| {
            if f > nyquist {
                warn!(
                    "band frequency {} Hz exceeds the Nyquist limit of {} Hz",
                    f, nyquist
                );
            }
            frequency_to_bin(f, sample_rate, chunk_size)
        })
        .collect();

    let mut ranges = Vec::with_capacity(boundaries.len() + 1);
    let mut start = 0;
    for &boundary in &boundaries {
        ranges.push(BandRange::new(start, boundary));
        start = boundary;
    }
    ranges.push(BandRange::new(start, spectrum_len));

    ranges
}

/// Peak magnitude of each band, floored at `SILENCE_MAGNITUDE`
///
/// Ranges are clamped to the spectrum, so out-of-range boundaries from
/// above-Nyquist frequencies read as silence instead of panicking.
pub fn band_magnitudes(spectrum: &[f64], ranges: &[BandRange]) -> Vec<f64> {
    ranges
        .iter()
        .map(|range| {
            let end = range.end.min(spectrum.len());
            let start = range.start.min(end);
            spectrum[start..end]
                .iter()
                .copied()
                .fold(SILENCE_MAGNITUDE, f64::max)
        })
        .collect()
}

/// Cached band ranges for one (frequencies, sample rate, chunk size) triple
///
/// Every setter recomputes the ranges before returning, so `ranges()` can
/// never hand out a layout built for another configuration.
#[derive(Debug, Clone)]
pub struct BandLayout {
    frequencies: Vec<f64>,
    sample_rate: u32,
    chunk_size: usize,
    ranges: Vec<BandRange>,
}

impl BandLayout {
    pub fn new(frequencies: Vec<f64>, sample_rate: u32, chunk_size: usize) -> Self {
        let ranges = compute_band_ranges(&frequencies, sample_rate, chunk_size);
        Self {
            frequencies,
            sample_rate,
            chunk_size,
            ranges,
        }
    }

    /// Replace the band definition
    pub fn set_frequencies(&mut self, frequencies: Vec<f64>) {
        self.frequencies = frequencies;
        self.recompute();
    }

    /// Follow a source whose sample rate or chunk size changed
    pub fn set_format(&mut self, sample_rate: u32, chunk_size: usize) {
        if sample_rate == self.sample_rate && chunk_size == self.chunk_size {
            return;
        }
        self.sample_rate = sample_rate;
        self.chunk_size = chunk_size;
        self.recompute();
    }

    fn recompute(&mut self) {
        self.ranges = compute_band_ranges(&self.frequencies, self.sample_rate, self.chunk_size);
    }

    pub fn ranges(&self) -> &[BandRange] {
        &self.ranges
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Number of display bands (frequencies + trailing band)
    pub fn band_count(&self) -> usize {
        self.ranges.len()
    }

    /// Per-band peak magnitudes of `spectrum` under this layout
    pub fn magnitudes(&self, spectrum: &[f64]) -> Vec<f64> {
        band_magnitudes(spectrum, &self.ranges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULT_BANDS: [f64; 7] = [50.0, 100.0, 250.0, 500.0, 750.0, 1000.0, 2000.0];

    #[test]
    fn test_half_rounds_up() {
        // 100 * 5 / 1000 = 0.5
        assert_eq!(frequency_to_bin(5.0, 1000, 100), 1);
        // 0.49 truncates, 0.51 rounds up
        assert_eq!(frequency_to_bin(4.9, 1000, 100), 0);
        assert_eq!(frequency_to_bin(5.1, 1000, 100), 1);
        assert_eq!(frequency_to_bin(27.0, 1000, 100), 3);
    }

    #[test]
    fn test_zero_frequency_starts_at_zero() {
        let ranges = compute_band_ranges(&[0.0, 100.0], 1000, 100);
        assert_eq!(ranges[0], BandRange::new(0, 0));
        assert!(ranges[0].is_empty());
        assert_eq!(ranges[1].start, 0);
    }

    #[test]
    fn test_default_bands_partition_spectrum() {
        let ranges = compute_band_ranges(&DEFAULT_BANDS, 44100, 4096);
        assert_eq!(ranges.len(), DEFAULT_BANDS.len() + 1);

        // 4096 * 50 / 44100 = 4.64 -> 5, 4096 * 100 / 44100 = 9.29 -> 9
        assert_eq!(ranges[0], BandRange::new(0, 5));
        assert_eq!(ranges[1], BandRange::new(5, 9));
        assert_eq!(ranges[7], BandRange::new(186, 2048));

        assert_eq!(ranges[0].start, 0);
        assert_eq!(ranges.last().unwrap().end, 2048);
        for pair in ranges.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
            assert!(pair[0].start <= pair[1].start);
        }
    }

    #[test]
    fn test_deterministic() {
        let a = compute_band_ranges(&DEFAULT_BANDS, 48000, 2048);
        let b = compute_band_ranges(&DEFAULT_BANDS, 48000, 2048);
        assert_eq!(a, b);
    }

    #[test]
    fn test_above_nyquist_still_maps() {
        let ranges = compute_band_ranges(&[100.0, 30000.0], 44100, 1024);
        assert_eq!(ranges.len(), 3);
        assert!(ranges[1].end > 512);

        // The trailing range is inverted and must read as silence
        let spectrum = vec![5.0; 512];
        let mags = band_magnitudes(&spectrum, &ranges);
        assert_eq!(mags[1], 5.0);
        assert_eq!(mags[2], SILENCE_MAGNITUDE);
    }

    #[test]
    fn test_empty_and_quiet_bands_floor_to_silence() {
        let ranges = vec![BandRange::new(0, 0), BandRange::new(0, 2), BandRange::new(2, 4)];
        let spectrum = vec![0.2, 0.4, 3.0, 7.5];

        assert_eq!(band_magnitudes(&spectrum, &ranges), vec![1.0, 1.0, 7.5]);
    }

    #[test]
    fn test_layout_recomputes_on_reconfigure() {
        let mut layout = BandLayout::new(vec![100.0, 200.0], 1000, 100);
        assert_eq!(layout.ranges()[0], BandRange::new(0, 10));
        assert_eq!(layout.band_count(), 3);

        layout.set_frequencies(vec![300.0]);
        assert_eq!(layout.band_count(), 2);
        assert_eq!(layout.ranges()[0], BandRange::new(0, 30));
        assert_eq!(layout.ranges()[1], BandRange::new(30, 50));

        layout.set_format(2000, 100);
        assert_eq!(layout.ranges()[0], BandRange::new(0, 15));
        assert_eq!(
            layout.ranges(),
            compute_band_ranges(&[300.0], 2000, 100).as_slice()
        );
    }
}
