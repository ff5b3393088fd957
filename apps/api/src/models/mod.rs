pub mod cv;
pub mod validation;

pub use cv::CvRecord;
pub use validation::validate_record;
