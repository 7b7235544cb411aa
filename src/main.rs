use hivemap::app::App;
use hivemap::hive::config::HiveConfig;
use winit::event_loop::EventLoop;

fn main() {
    env_logger::init();

    let config = HiveConfig::load();
    let event_loop = EventLoop::new().expect("failed to create event loop");
    let mut app = App::new(config);
    event_loop.run_app(&mut app).expect("event loop error");
}
