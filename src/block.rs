use crossbeam_channel::{Receiver, Sender, unbounded};

use crate::error::{FilterError, Result};
use crate::iir::IirFilter;
use crate::taps::Taps;

/// Scheduler-facing streaming IIR filter block.
///
/// The scheduling loop owns the block and calls [`IirBlock::process`] once
/// per quantum with an input buffer and an output buffer of its choosing.
/// Between those calls the block is idle. A retune queued through the
/// [`TapsControl`] handle is installed at the next `process` entry, so
/// coefficients never change under a partially shifted delay line.
pub struct IirBlock {
    filter: IirFilter,
    pending: Receiver<Taps>,
}

/// Control-plane handle for retuning a running [`IirBlock`].
///
/// Clone freely; sends never block. Validation happens here, so the caller
/// gets the error synchronously and the streaming side only ever receives
/// usable coefficient sets. When several retunes are queued during one
/// quantum, only the newest is installed.
#[derive(Clone)]
pub struct TapsControl {
    tx: Sender<Taps>,
}

impl IirBlock {
    /// Build a block and its control handle. Fails with
    /// [`FilterError::InvalidTaps`] when `fftaps` is empty.
    pub fn new(fftaps: &[f64], fbtaps: &[f64]) -> Result<(Self, TapsControl)> {
        Ok(Self::with_taps(Taps::new(
            fftaps.to_vec(),
            fbtaps.to_vec(),
        )?))
    }

    /// Build a block from a pre-validated coefficient set.
    pub fn with_taps(taps: Taps) -> (Self, TapsControl) {
        let filter = IirFilter::with_taps(taps);
        let (tx, rx) = unbounded();
        (
            Self {
                filter,
                pending: rx,
            },
            TapsControl { tx },
        )
    }

    /// Scheduler entry point: one output sample per input sample, over
    /// `min(input.len(), output.len())`. Returns the count produced.
    ///
    /// Any retune queued since the previous call is installed first, then
    /// the whole block runs under the resulting coefficients.
    pub fn process(&mut self, input: &[f32], output: &mut [f32]) -> usize {
        self.install_pending();
        self.filter.filter_block(input, output)
    }

    /// Retune immediately from the streaming context. `&mut self` rules
    /// out a block computation in flight.
    pub fn set_taps(&mut self, fftaps: &[f64], fbtaps: &[f64]) -> Result<()> {
        self.filter
            .set_taps(Taps::new(fftaps.to_vec(), fbtaps.to_vec())?);
        Ok(())
    }

    /// The currently installed coefficient set. Queued retunes are not
    /// visible until the next [`IirBlock::process`] call.
    pub fn taps(&self) -> &Taps {
        self.filter.taps()
    }

    /// Access the underlying kernel, e.g. for frequency-response queries
    pub fn filter(&self) -> &IirFilter {
        &self.filter
    }

    fn install_pending(&mut self) {
        let mut newest = None;
        while let Ok(taps) = self.pending.try_recv() {
            newest = Some(taps);
        }
        if let Some(taps) = newest {
            log::debug!(
                "retuning: {} feed-forward, {} feedback taps",
                taps.fftaps().len(),
                taps.fbtaps().len()
            );
            self.filter.set_taps(taps);
        }
    }
}

impl TapsControl {
    /// Validate and queue a retune for the streaming side.
    ///
    /// Returns [`FilterError::InvalidTaps`] for an empty `fftaps` and
    /// [`FilterError::BlockGone`] when the block has been dropped. On
    /// success the update takes effect at the block's next quantum.
    pub fn set_taps(&self, fftaps: &[f64], fbtaps: &[f64]) -> Result<()> {
        let taps = Taps::new(fftaps.to_vec(), fbtaps.to_vec())?;
        self.tx.send(taps).map_err(|_| FilterError::BlockGone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queued_retune_applies_at_block_entry() {
        let (mut block, control) = IirBlock::new(&[1.0], &[]).unwrap();

        control.set_taps(&[0.5], &[]).unwrap();
        // Not yet visible: the block is idle, nothing has installed it.
        assert_eq!(block.taps().fftaps(), &[1.0]);

        let mut output = [0.0f32; 1];
        block.process(&[1.0], &mut output);
        assert_eq!(output, [0.5]);
        assert_eq!(block.taps().fftaps(), &[0.5]);
    }

    #[test]
    fn test_newest_queued_retune_wins() {
        let (mut block, control) = IirBlock::new(&[1.0], &[]).unwrap();

        control.set_taps(&[0.5], &[]).unwrap();
        control.set_taps(&[0.25], &[]).unwrap();

        let mut output = [0.0f32; 1];
        block.process(&[1.0], &mut output);
        assert_eq!(output, [0.25]);
    }

    #[test]
    fn test_invalid_retune_rejected_synchronously() {
        let (mut block, control) = IirBlock::new(&[1.0], &[]).unwrap();

        let err = control.set_taps(&[], &[0.5]).unwrap_err();
        assert!(matches!(err, FilterError::InvalidTaps(_)));

        // The rejected update never reaches the stream.
        let mut output = [0.0f32; 1];
        block.process(&[2.0], &mut output);
        assert_eq!(output, [2.0]);
    }

    #[test]
    fn test_control_outliving_block() {
        let (block, control) = IirBlock::new(&[1.0], &[]).unwrap();
        drop(block);

        let err = control.set_taps(&[0.5], &[]).unwrap_err();
        assert!(matches!(err, FilterError::BlockGone));
    }

    #[test]
    fn test_direct_set_taps_is_immediate() {
        let (mut block, _control) = IirBlock::new(&[1.0], &[]).unwrap();
        block.set_taps(&[2.0], &[]).unwrap();
        assert_eq!(block.taps().fftaps(), &[2.0]);

        let mut output = [0.0f32; 1];
        block.process(&[1.0], &mut output);
        assert_eq!(output, [2.0]);
    }

    #[test]
    fn test_history_continues_across_quanta() {
        let (mut block, _control) = IirBlock::new(&[1.0], &[0.5]).unwrap();

        let mut first = [0.0f32; 2];
        let mut second = [0.0f32; 2];
        block.process(&[1.0, 0.0], &mut first);
        block.process(&[0.0, 0.0], &mut second);

        assert_eq!(first, [1.0, 0.5]);
        assert_eq!(second, [0.25, 0.125]);
    }
}
