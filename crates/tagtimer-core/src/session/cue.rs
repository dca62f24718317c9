use std::io::Write;

/// Something that tells the user a run finished (a bell, a sound, a toast).
pub trait CompletionCue {
    fn play(&self) -> std::io::Result<()>;
}

/// Play the cue, logging and swallowing any failure.
pub fn notify(cue: &dyn CompletionCue) {
    if let Err(e) = cue.play() {
        tracing::warn!(error = %e, "completion cue unavailable");
    }
}

/// Rings the terminal bell on stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalBell;

impl CompletionCue for TerminalBell {
    fn play(&self) -> std::io::Result<()> {
        let mut err = std::io::stderr();
        err.write_all(b"\x07")?;
        err.flush()
    }
}

/// Does nothing; used when notifications are switched off.
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl CompletionCue for Silent {
    fn play(&self) -> std::io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Broken<'a>(&'a Cell<u32>);

    impl CompletionCue for Broken<'_> {
        fn play(&self) -> std::io::Result<()> {
            self.0.set(self.0.get() + 1);
            Err(std::io::Error::other("no audio device"))
        }
    }

    #[test]
    fn failing_cue_does_not_propagate() {
        let calls = Cell::new(0);
        notify(&Broken(&calls));
        assert_eq!(calls.get(), 1);
        notify(&Silent);
    }
}
