//! Wizard steps
//!
//! The half-and-half dialog walks `Size → Flavors → Options`. The options step is left
//! out entirely when the category offers neither crusts nor addons.

use thiserror::Error;

/// Errors raised by step navigation.
#[derive(Debug, Error, PartialEq)]
pub enum WizardError {
    /// The size step cannot be left without a size.
    #[error("choose a size first")]
    NoSizeSelected,

    /// There is no step after the last one.
    #[error("already at the last step")]
    AtLastStep,
}

/// One step of the dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Pick a size
    Size,

    /// Pick the flavors
    Flavors,

    /// Answer dough, crust and addon groups
    Options,
}

/// Linear step state machine.
#[derive(Debug, Clone, Copy)]
pub struct Wizard {
    current: Step,
    has_options_step: bool,
}

impl Wizard {
    /// Start at the size step.
    pub fn new(has_options_step: bool) -> Self {
        Self {
            current: Step::Size,
            has_options_step,
        }
    }

    /// The step being shown.
    pub fn current(self) -> Step {
        self.current
    }

    /// Whether the dialog includes an options step.
    pub fn has_options_step(self) -> bool {
        self.has_options_step
    }

    /// Whether the current step is the last one, where the item is added to the cart.
    pub fn is_last(self) -> bool {
        match self.current {
            Step::Size => false,
            Step::Flavors => !self.has_options_step,
            Step::Options => true,
        }
    }

    /// Move forward.
    ///
    /// # Errors
    ///
    /// - [`WizardError::NoSizeSelected`]: leaving the size step without a size.
    /// - [`WizardError::AtLastStep`]: already at the last step.
    pub fn next(&mut self, size_selected: bool) -> Result<Step, WizardError> {
        self.current = match self.current {
            Step::Size if !size_selected => return Err(WizardError::NoSizeSelected),
            Step::Size => Step::Flavors,
            Step::Flavors if self.has_options_step => Step::Options,
            Step::Flavors | Step::Options => return Err(WizardError::AtLastStep),
        };

        Ok(self.current)
    }

    /// Move back; stays put at the first step.
    pub fn back(&mut self) -> Step {
        self.current = match self.current {
            Step::Size | Step::Flavors => Step::Size,
            Step::Options => Step::Flavors,
        };

        self.current
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn walks_forward_through_every_step() -> TestResult {
        let mut wizard = Wizard::new(true);

        assert_eq!(wizard.next(true)?, Step::Flavors);
        assert_eq!(wizard.next(true)?, Step::Options);
        assert!(wizard.is_last());
        assert_eq!(wizard.next(true), Err(WizardError::AtLastStep));

        Ok(())
    }

    #[test]
    fn size_step_needs_a_size() {
        let mut wizard = Wizard::new(true);

        assert_eq!(wizard.next(false), Err(WizardError::NoSizeSelected));
        assert_eq!(wizard.current(), Step::Size);
    }

    #[test]
    fn options_step_is_skipped_when_not_offered() -> TestResult {
        let mut wizard = Wizard::new(false);

        wizard.next(true)?;

        assert!(wizard.is_last());
        assert_eq!(wizard.next(true), Err(WizardError::AtLastStep));

        Ok(())
    }

    #[test]
    fn back_walks_to_the_first_step() -> TestResult {
        let mut wizard = Wizard::new(true);

        wizard.next(true)?;
        wizard.next(true)?;

        assert_eq!(wizard.back(), Step::Flavors);
        assert_eq!(wizard.back(), Step::Size);
        assert_eq!(wizard.back(), Step::Size);

        Ok(())
    }
}
