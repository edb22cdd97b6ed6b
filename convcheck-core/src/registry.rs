//! Named test cases and the ordered registry that holds them.
//!
//! A registry is built once at startup, then handed by reference to the
//! driver, which runs the cases in registration order.

use std::fmt;

use crate::matrix::{Matrix, MatrixError};

/// Signal and kernel produced by a test case generator.
pub type MatrixPair = (Matrix, Matrix);

type Generator = Box<dyn Fn() -> Result<MatrixPair, MatrixError>>;

/// A named, zero-argument generator of a signal and kernel.
///
/// # Examples
/// ```
/// use convcheck_core::{TestCase, registry::sqr_ones};
///
/// let case = TestCase::new("test_5x3", || Ok((sqr_ones(5)?, sqr_ones(3)?)));
/// let (a, b) = case.generate()?;
/// assert_eq!((a.size(), b.size()), (5, 3));
/// # Ok::<(), convcheck_core::MatrixError>(())
/// ```
pub struct TestCase {
    name: String,
    generator: Generator,
}

impl TestCase {
    /// Creates a test case named `name`.
    pub fn new(
        name: impl Into<String>,
        generator: impl Fn() -> Result<MatrixPair, MatrixError> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            generator: Box::new(generator),
        }
    }

    /// Name printed in the report.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Builds fresh matrices for one run.
    ///
    /// # Errors
    /// Returns whatever [`MatrixError`] the generator raises.
    pub fn generate(&self) -> Result<MatrixPair, MatrixError> {
        (self.generator)()
    }
}

impl fmt::Debug for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestCase")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Ordered, append-only list of test cases.
#[derive(Debug, Default)]
pub struct TestRegistry {
    cases: Vec<TestCase>,
}

impl TestRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self { cases: Vec::new() }
    }

    /// Appends `case`. Names are not de-duplicated.
    pub fn register(&mut self, case: TestCase) -> &mut Self {
        self.cases.push(case);
        self
    }

    /// Builder form of [`Self::register`].
    #[must_use]
    pub fn with_case(
        mut self,
        name: impl Into<String>,
        generator: impl Fn() -> Result<MatrixPair, MatrixError> + 'static,
    ) -> Self {
        self.register(TestCase::new(name, generator));
        self
    }

    /// Registry holding the shipped all-ones cases.
    ///
    /// # Examples
    /// ```
    /// use convcheck_core::TestRegistry;
    ///
    /// let registry = TestRegistry::builtin();
    /// let names: Vec<&str> = registry.names().collect();
    /// assert_eq!(
    ///     names,
    ///     ["test_5x3", "test_1x9", "test_31x9", "test_1024x3", "test_1024x9", "test_1023x9"],
    /// );
    /// ```
    #[must_use]
    pub fn builtin() -> Self {
        [(5, 3), (1, 9), (31, 9), (1024, 3), (1024, 9), (1023, 9)]
            .into_iter()
            .fold(Self::new(), |registry, (n, m)| {
                registry.with_case(format!("test_{n}x{m}"), move || {
                    Ok((sqr_ones(n)?, sqr_ones(m)?))
                })
            })
    }

    /// Number of registered cases.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    /// `true` when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Iterates over the cases in registration order.
    pub fn iter(&self) -> std::slice::Iter<'_, TestCase> {
        self.cases.iter()
    }

    /// Iterates over the case names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.cases.iter().map(TestCase::name)
    }
}

impl<'a> IntoIterator for &'a TestRegistry {
    type Item = &'a TestCase;
    type IntoIter = std::slice::Iter<'a, TestCase>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A `size × size` matrix of ones.
///
/// # Errors
/// Returns [`MatrixError::ZeroSize`] when `size` is zero.
pub fn sqr_ones(size: usize) -> Result<Matrix, MatrixError> {
    Matrix::ones(size)
}
