pub mod kinematics;
pub mod recursive_newton_euler;
