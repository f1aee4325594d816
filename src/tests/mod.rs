mod test_utils;
mod arm_motion;
