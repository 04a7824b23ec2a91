/// Common trait for streaming sample processors.
///
/// Anything that maps one input sample to one output sample while keeping
/// internal state between calls fits here. State persists across buffer
/// boundaries, so processing a signal in chunks gives the same output as
/// processing it in one call.
pub trait Filter {
    /// Process a single sample through the filter
    fn process(&mut self, sample: f32) -> f32;

    /// Process a buffer of samples in-place
    fn process_buffer(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }
}
