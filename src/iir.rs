use num_complex::Complex64;

use crate::error::Result;
use crate::filter::Filter;
use crate::taps::Taps;

/// Streaming IIR filter in Direct Form I: float samples, double taps.
///
/// Input and output satisfy the difference equation
///
/// ```text
/// y[n] = sum(k=0..N) b[k]*x[n-k] + sum(k=1..M) a[k]*y[n-k]
/// ```
///
/// where `b` are the feed-forward taps and `a[k]` is `fbtaps[k-1]`. The
/// feedback terms are added; tap sets designed against the
/// plus-in-the-denominator transfer-function convention must be negated
/// before use.
///
/// All accumulation runs in f64 regardless of the f32 sample type.
/// Stability is the caller's responsibility: feedback taps placing poles
/// outside the unit circle diverge silently.
#[derive(Debug)]
pub struct IirFilter {
    taps: Taps,
    in_line: Vec<f64>,
    in_pos: usize,
    out_line: Vec<f64>,
    out_pos: usize,
}

impl IirFilter {
    /// Create a filter with zeroed history. Fails with
    /// [`FilterError::InvalidTaps`](crate::FilterError::InvalidTaps) when
    /// `fftaps` is empty.
    pub fn new(fftaps: &[f64], fbtaps: &[f64]) -> Result<Self> {
        Ok(Self::with_taps(Taps::new(fftaps.to_vec(), fbtaps.to_vec())?))
    }

    /// Create a filter from a pre-validated coefficient set.
    pub fn with_taps(taps: Taps) -> Self {
        let in_line = vec![0.0; taps.fftaps().len()];
        let out_line = vec![0.0; taps.fbtaps().len()];
        Self {
            taps,
            in_line,
            in_pos: 0,
            out_line,
            out_pos: 0,
        }
    }

    /// Install new coefficients.
    ///
    /// A delay line whose length changed is re-allocated zero-filled: no
    /// valid history exists for a changed recurrence order. A line whose
    /// length is unchanged keeps its samples, so a same-order retune
    /// continues seamlessly with the new coefficients applied to the
    /// existing history.
    pub fn set_taps(&mut self, taps: Taps) {
        if taps.fftaps().len() != self.in_line.len() {
            self.in_line = vec![0.0; taps.fftaps().len()];
            self.in_pos = 0;
        }
        if taps.fbtaps().len() != self.out_line.len() {
            self.out_line = vec![0.0; taps.fbtaps().len()];
            self.out_pos = 0;
        }
        self.taps = taps;
    }

    /// The currently installed coefficient set
    pub fn taps(&self) -> &Taps {
        &self.taps
    }

    /// Zero both delay lines, keeping the coefficients
    pub fn reset(&mut self) {
        self.in_line.fill(0.0);
        self.in_pos = 0;
        self.out_line.fill(0.0);
        self.out_pos = 0;
    }

    /// Run one sample through the recurrence.
    ///
    /// Both delay lines iterate in two contiguous reverse ranges to avoid
    /// modulo arithmetic in the inner loops.
    pub fn filter_one(&mut self, sample: f32) -> f32 {
        let ff = self.taps.fftaps();
        let n = ff.len();
        self.in_line[self.in_pos] = sample as f64;

        let mut acc = 0.0f64;
        let mut tap_i = 0usize;
        for idx in (0..=self.in_pos).rev() {
            acc += ff[tap_i] * self.in_line[idx];
            tap_i += 1;
        }
        for idx in ((self.in_pos + 1)..n).rev() {
            acc += ff[tap_i] * self.in_line[idx];
            tap_i += 1;
        }
        debug_assert_eq!(tap_i, n);

        let fb = self.taps.fbtaps();
        let m = fb.len();
        let mut tap_i = 0usize;
        for idx in (0..self.out_pos).rev() {
            acc += fb[tap_i] * self.out_line[idx];
            tap_i += 1;
        }
        for idx in (self.out_pos..m).rev() {
            acc += fb[tap_i] * self.out_line[idx];
            tap_i += 1;
        }
        debug_assert_eq!(tap_i, m);

        self.in_pos += 1;
        if self.in_pos == n {
            self.in_pos = 0;
        }
        if m > 0 {
            self.out_line[self.out_pos] = acc;
            self.out_pos += 1;
            if self.out_pos == m {
                self.out_pos = 0;
            }
        }
        acc as f32
    }

    /// Filter a block of samples, one output per input, in order, over
    /// `min(input.len(), output.len())`. Returns the count produced.
    /// History carries across calls.
    pub fn filter_block(&mut self, input: &[f32], output: &mut [f32]) -> usize {
        let n = input.len().min(output.len());
        for (x, y) in input[..n].iter().zip(output[..n].iter_mut()) {
            *y = self.filter_one(*x);
        }
        n
    }

    /// Evaluate the frequency response H(e^jw) of the current taps:
    ///
    /// ```text
    /// H(z) = B(z) / (1 - A(z)),  B(z) = sum b[k]*z^-k,  A(z) = sum a[k]*z^-k
    /// ```
    pub fn frequency_response(&self, omega: f64) -> Complex64 {
        let z_inv = Complex64::from_polar(1.0, -omega);

        let mut num = Complex64::new(0.0, 0.0);
        let mut zk = Complex64::new(1.0, 0.0);
        for &b in self.taps.fftaps() {
            num += zk * b;
            zk *= z_inv;
        }

        let mut den = Complex64::new(1.0, 0.0);
        let mut zk = z_inv;
        for &a in self.taps.fbtaps() {
            den -= zk * a;
            zk *= z_inv;
        }

        num / den
    }
}

impl Filter for IirFilter {
    fn process(&mut self, sample: f32) -> f32 {
        self.filter_one(sample)
    }
}
