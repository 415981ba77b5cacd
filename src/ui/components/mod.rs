mod employee_picker;
mod key_result;

pub use employee_picker::{EmployeePicker, EmployeePickerEvent};
pub use key_result::KeyResult;
