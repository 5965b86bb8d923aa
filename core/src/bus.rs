/// A 16-bit word-addressed bus.
///
/// Every device the CPU talks to — RAM, ROM, or the `MappedBus` that routes
/// between them — implements this trait. Reads to unmapped addresses return
/// 0; writes to unmapped addresses are dropped. Implementations must be pure
/// with respect to other devices on the same bus, though they may be
/// internally stateful (e.g. the post-increment/pre-decrement side effects
/// the CPU's SP-relative address modes apply before calling `read`/`write`).
pub trait Bus {
    /// Read the word at `addr`.
    fn read(&mut self, addr: u16) -> u16;

    /// Write `value` at `addr`.
    fn write(&mut self, addr: u16, value: u16);
}
