//! Command line front end running the controllers against the simulated arm and base.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use nalgebra::Vector2;
use tracing::info;
use tracing_subscriber::EnvFilter;

use rs_cobot_motion::arm_controller::ArmController;
use rs_cobot_motion::base_controller::Pose2D;
use rs_cobot_motion::base_motion::BaseMotionController;
use rs_cobot_motion::config::{ArmControllerConfig, MotionConfig};
use rs_cobot_motion::feedback::{feedback_channel, odometry_channel};
use rs_cobot_motion::jacobian::Jacobian;
use rs_cobot_motion::kinematic_traits::{Joints, Kinematics, Pose, Solutions, JOINTS_AT_ZERO};
use rs_cobot_motion::kinematics_impl::DhKinematics;
use rs_cobot_motion::path_check::PathValidator;
use rs_cobot_motion::simulation::{SimulatedArm, SimulatedBase};
use rs_cobot_motion::utils::{dump_joints, dump_pose, joints};

#[derive(Parser)]
#[command(name = "rs-cobot-motion")]
#[command(about = "Kinematics and simulated motion of the arm and the mobile base")]
struct Args {
    /// YAML configuration, built in defaults if not given
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the end effector pose for the joint values (degrees)
    Forward {
        #[arg(num_args = 6, allow_negative_numbers = true)]
        joints: Vec<f32>,
    },
    /// Print the Jacobian determinant and smallest singular value (joints in degrees)
    Jacobian {
        #[arg(num_args = 6, allow_negative_numbers = true)]
        joints: Vec<f32>,
    },
    /// Move the simulated arm from zero to the joint values (degrees)
    Move {
        #[arg(num_args = 6, allow_negative_numbers = true)]
        joints: Vec<f32>,

        /// Number of path waypoints, configured value if not given
        #[arg(short, long)]
        waypoints: Option<usize>,

        /// Override of the filter settling time, seconds
        #[arg(long)]
        settling_time: Option<f64>,
    },
    /// Drive the simulated base
    Base {
        #[command(subcommand)]
        motion: BaseMotion,
    },
    /// Print the effective configuration as YAML
    Config,
}

#[derive(Subcommand)]
enum BaseMotion {
    /// Straight line along the heading, meters
    Forward {
        #[arg(allow_negative_numbers = true)]
        distance: f64,
    },
    /// In place rotation, degrees
    Rotate {
        #[arg(allow_negative_numbers = true)]
        angle: f64,
    },
    /// Turn towards the point and drive to it
    Drive {
        #[arg(allow_negative_numbers = true)]
        x: f64,
        #[arg(allow_negative_numbers = true)]
        y: f64,
    },
}

fn main() {
    // Setup logging (set RUST_LOG=debug for more)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => MotionConfig::from_yaml_file(path)
            .with_context(|| format!("Failed to read configuration {}", path.display()))?,
        None => MotionConfig::default(),
    };
    let kinematics = DhKinematics::new(config.links);

    match args.command {
        Command::Forward { joints: values } => {
            let qs = degrees(&values)?;
            dump_pose(&kinematics.forward(&qs));
        }
        Command::Jacobian { joints: values } => {
            let qs = degrees(&values)?;
            let jacobian = Jacobian::new(&kinematics, &qs);
            println!("determinant: {:.6e}", jacobian.determinant());
            println!("min singular value: {:.6e}", jacobian.min_singular_value());
            match config.arm.singularity.is_singular(&jacobian) {
                Some(_) => println!("singular"),
                None => println!("regular"),
            }
        }
        Command::Move { joints: values, waypoints, settling_time } => {
            let target = degrees(&values)?;
            let mut arm_config = config.arm.clone();
            if let Some(settling_time) = settling_time {
                arm_config.settling_time = settling_time;
            }
            let waypoints = waypoints.unwrap_or(arm_config.waypoints);
            simulate_arm(&config, arm_config, kinematics, &target, waypoints)?;
        }
        Command::Base { motion } => simulate_base(&config, motion)?,
        Command::Config => print!("{}", config.to_yaml()),
    }
    Ok(())
}

fn degrees(values: &[f32]) -> Result<Joints> {
    let values: [f32; 6] = values
        .try_into()
        .map_err(|_| anyhow!("six joint values expected, got {}", values.len()))?;
    Ok(joints(&values))
}

fn simulate_arm(
    config: &MotionConfig,
    arm_config: ArmControllerConfig,
    kinematics: DhKinematics,
    target: &Joints,
    waypoints: usize,
) -> Result<()> {
    let (writer, reader) = feedback_channel(arm_config.name_map());
    let arm = SimulatedArm::new(writer, &JOINTS_AT_ZERO);
    let validator = PathValidator::new(
        Arc::new(kinematics),
        config.workspace.build(),
        arm_config.singularity,
    );
    // No inverse kinematics solver here, joint targets only.
    let no_solver = Arc::new(|_: &Pose| Solutions::new());
    let mut controller = ArmController::new(
        arm_config,
        validator,
        no_solver,
        Box::new(arm.clone()),
        Box::new(arm.clone()),
        reader,
    )?;

    let report = controller.move_to_joints(target, waypoints)?;
    info!("{} commands in {:?}", report.ticks, report.elapsed);
    dump_joints(&controller.get_joint_state());
    dump_pose(&controller.kinematics().forward(&controller.get_joint_state()));
    Ok(())
}

fn simulate_base(config: &MotionConfig, motion: BaseMotion) -> Result<()> {
    let (writer, reader) = odometry_channel();
    let base = Arc::new(SimulatedBase::new(writer, Pose2D::default(), config.base.dt()));
    let mut controller = BaseMotionController::new(config.base.clone(), Box::new(base.clone()), reader)?;

    let pose = match motion {
        BaseMotion::Forward { distance } => controller.forward(distance)?,
        BaseMotion::Rotate { angle } => controller.rotate(angle.to_radians())?,
        BaseMotion::Drive { x, y } => controller.drive_to(&Vector2::new(x, y))?,
    };
    println!("x: {:.4}, y: {:.4}, heading: {:.2} deg", pose.x, pose.y, pose.theta.to_degrees());
    info!("{} velocity commands", base.commands());
    Ok(())
}
