use eframe::egui;
use egui_plot::{HLine, Line, Plot, PlotPoints};
use nalgebra::Vector2;

use lane_sim::config::SessionConfig;
use lane_sim::sim::{Session, SessionResult};

fn main() -> eframe::Result {
    let config = SessionConfig::default();
    let app = LaneViz::new(&config);
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1400.0, 800.0]),
        ..Default::default()
    };
    eframe::run_native("PID Controller: Car Lane Changing", options, Box::new(|_| Ok(Box::new(app))))
}

/// Slider values; a change triggers a new session run.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Tuning {
    kp: f64,
    ki: f64,
    kd: f64,
    initial_y: f64,
    setpoint: f64,
}

struct LaneViz {
    session: Session,
    tuning: Tuning,
    result: SessionResult,
}

impl LaneViz {
    fn new(config: &SessionConfig) -> Self {
        let mut session = Session::from_config(config);
        let result = session.run();
        let tuning = Tuning {
            kp: config.kp,
            ki: config.ki,
            kd: config.kd,
            initial_y: config.initial_position[1],
            setpoint: config.setpoint,
        };
        Self { session, tuning, result }
    }

    fn rerun(&mut self) {
        let t = self.tuning;
        let pid = self.session.controller_mut();
        pid.set_gains(t.kp, t.ki, t.kd);
        pid.set_target(t.setpoint);
        self.session.set_initial_position(Vector2::new(0.0, t.initial_y));
        self.result = self.session.run();
    }
}

impl eframe::App for LaneViz {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let before = self.tuning;

        egui::TopBottomPanel::top("tuning").show(ctx, |ui| {
            ui.heading("PID Controller: Car Lane Changing");
            ui.horizontal(|ui| {
                ui.vertical(|ui| {
                    ui.add(egui::Slider::new(&mut self.tuning.kp, 0.0..=2.0).text("Kp"));
                    ui.add(egui::Slider::new(&mut self.tuning.ki, 0.0..=2.0).text("Ki"));
                    ui.add(egui::Slider::new(&mut self.tuning.kd, 0.0..=2.0).text("Kd"));
                });
                ui.add_space(40.0);
                ui.vertical(|ui| {
                    ui.add(
                        egui::Slider::new(&mut self.tuning.initial_y, 0.0..=200.0)
                            .step_by(1.0)
                            .text("Initial Y-Position"),
                    );
                    ui.add(
                        egui::Slider::new(&mut self.tuning.setpoint, 0.0..=200.0)
                            .step_by(1.0)
                            .text("Setpoint Y-Position"),
                    );
                });
            });
        });

        if self.tuning != before {
            self.rerun();
        }

        let setpoint = self.tuning.setpoint;
        let r = &self.result;

        egui::CentralPanel::default().show(ctx, |ui| {
            let available = ui.available_size();
            let third_w = available.x / 3.0 - 8.0;
            let h = available.y - 24.0;

            ui.horizontal(|ui| {
                // Y position vs Time
                ui.vertical(|ui| {
                    ui.label("Car Trajectory over Y-axis Perspective");
                    let points: PlotPoints = r.times.iter()
                        .zip(r.y_positions())
                        .map(|(t, y)| [*t, y])
                        .collect();
                    Plot::new("y_over_time")
                        .width(third_w)
                        .height(h)
                        .x_axis_label("Time")
                        .y_axis_label("Y-axis Position")
                        .show(ui, |plot_ui| {
                            plot_ui.line(Line::new("Car Trajectory (Y-axis)", points));
                            plot_ui.hline(HLine::new("Setpoint", setpoint));
                        });
                });

                // X position vs Time
                ui.vertical(|ui| {
                    ui.label("Car Trajectory over X-axis Perspective");
                    let points: PlotPoints = r.times.iter()
                        .zip(r.x_positions())
                        .map(|(t, x)| [*t, x])
                        .collect();
                    Plot::new("x_over_time")
                        .width(third_w)
                        .height(h)
                        .x_axis_label("Time")
                        .y_axis_label("X-axis Position")
                        .show(ui, |plot_ui| {
                            plot_ui.line(Line::new("Car Trajectory (X-axis)", points));
                        });
                });

                // Bird's eye view
                ui.vertical(|ui| {
                    ui.label("Car Trajectory: Bird's Eye View");
                    let points: PlotPoints = r.trajectory.iter()
                        .map(|p| [p.x, p.y])
                        .collect();
                    Plot::new("xy")
                        .width(third_w)
                        .height(h)
                        .x_axis_label("X Position")
                        .y_axis_label("Y Position")
                        .show(ui, |plot_ui| {
                            plot_ui.line(Line::new("Car X-Y Trajectory", points));
                            plot_ui.hline(HLine::new("Setpoint", setpoint));
                        });
                });
            });
        });
    }
}
