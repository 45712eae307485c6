//! Property-based tests for quadrature and minimization.
