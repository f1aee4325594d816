//! Defines the link parameter (DH table) data structure

pub mod dh_parameters {
    use crate::utils::deg;

    /// Modified Denavit-Hartenberg table of the arm (Craig convention). The transform
    /// from frame i-1 to frame i is `RotX(alpha[i]) * TransX(a[i]) * RotZ(q[i]) * TransZ(d[i])`.
    /// See [parameters_robots.rs](parameters_robots.rs) for concrete robot models.
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct LinkParameters {
        /// Twist between the previous and the current joint axis, radians.
        pub alpha: [f64; 6],

        /// Distance between the previous and the current joint axis along the previous x axis.
        pub a: [f64; 6],

        /// Offset along the joint axis.
        pub d: [f64; 6],
    }

    impl LinkParameters {
        /// Convert to string yaml representation (quick viewing, etc).
        pub fn to_yaml(&self) -> String {
            fn list(values: &[f64; 6], f: fn(&f64) -> String) -> String {
                values.iter().map(f).collect::<Vec<_>>().join(", ")
            }
            format!(
                "links:\n  \
                alpha: [{}]\n  \
                a: [{}]\n  \
                d: [{}]\n",
                list(&self.alpha, deg),
                list(&self.a, |x| x.to_string()),
                list(&self.d, |x| x.to_string()),
            )
        }
    }
}
