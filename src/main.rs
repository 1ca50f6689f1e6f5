
use align_trainer::Pipeline;

fn main() {
    Pipeline::run();
}
