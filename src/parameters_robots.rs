//! Hardcoded link parameters for the supported arms

pub mod dh_parameters {
    use crate::parameters::dh_parameters::LinkParameters;
    use std::f64::consts::PI;

    impl LinkParameters {
        /// Universal Robots UR5. The a values are the link lengths shifted
        /// by one joint as the modified convention requires.
        pub fn ur5() -> Self {
            LinkParameters {
                alpha: [0.0, PI / 2.0, 0.0, 0.0, PI / 2.0, -PI / 2.0],
                a: [0.0, 0.0, -0.425, -0.3922, 0.0, 0.0],
                d: [0.1625, 0.0, 0.0, 0.1333, 0.0997, 0.0996],
            }
        }
    }

    impl Default for LinkParameters {
        fn default() -> Self {
            Self::ur5()
        }
    }
}
