//! Account creation form for students and faculty.
//!
//! Academic choices cascade: school -> degree -> course -> current year.
//! Changing a choice clears everything below it, and switching between
//! student and faculty starts the form over.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::api::{ApiClient, ApiError};
use crate::utils::digits_only;
use crate::validation::check_email_domain;

// ============================================================================
// Constants
// ============================================================================

/// Minimum password length accepted by the backend
pub const MIN_PASSWORD_LEN: usize = 8;

/// Required number of phone digits
pub const PHONE_DIGITS: usize = 10;

pub const SEX_OPTIONS: [&str; 3] = ["Male", "Female", "Other"];

/// Schools and their courses with programme length in years.
/// A length of zero (doctoral programmes) means no year is asked for.
pub const ACADEMIC_CATALOG: &[(&str, &[(&str, u8)])] = &[
    (
        "Amrita International Law",
        &[("B.A., LL.B. (Hons.)", 5), ("B.B.A., LL.B. (Hons.)", 5)],
    ),
    (
        "School of Agricultural Sciences",
        &[
            ("B. Sc. (Hons.) Agriculture", 4),
            ("M. Sc. (Agriculture) in Agronomy", 2),
            ("Ph. D. in Agronomy", 0),
        ],
    ),
    (
        "School of Architecture",
        &[("Bachelor of Architecture", 5), ("Bachelor of Interior Design", 4)],
    ),
    (
        "School of Artificial Intelligence",
        &[
            ("B.Tech in Artificial Intelligence and Data Science", 4),
            ("B.Tech. Artificial Intelligence (AI) and Data Science (Medical Engineering)", 4),
            ("B. Tech. Artificial Intelligence (AI) and Data Science (Cyber Physical Systems and Security)", 4),
            ("B. Tech. Artificial Intelligence (AI) and Data Science (Autonomous Agents and Robotic Systems)", 4),
            ("B.Tech. Artificial Intelligence (AI) and Data Science (Quantum Technologies)", 4),
        ],
    ),
    (
        "School of Arts, Humanities & Commerce",
        &[
            ("B. A. (Hons) with Research in Mass Communication with Business Management and Media", 4),
            ("B. A. (Hons) with Research in Mass Communication with Digital Design and Animation", 4),
            ("MA Communication", 2),
            ("Ph. D. in Communication", 0),
        ],
    ),
    ("School of Business", &[("MBA", 2)]),
    (
        "School of Computing",
        &[
            ("B. Tech. in Computer Science and Engineering (CSE)", 4),
            ("B. Tech. in Computer Science and Engineering (Cyber Security)", 4),
            ("B. Tech. in Computer Science and Engineering (Artificial Intelligence)", 4),
            ("M. Tech. in Computer Science & Engineering", 2),
            ("M. Tech. in Data Science", 2),
            ("M. Tech. in Cyber Security", 2),
            ("M. Tech. in Artificial Intelligence", 2),
        ],
    ),
    (
        "School of Engineering",
        &[
            ("B. Tech. in Mechanical Engineering", 4),
            ("B. Tech. in Electronics and Communication Engineering", 4),
            ("M. Tech. in VLSI Design", 2),
            ("Ph. D. in Cyber Security", 0),
        ],
    ),
    (
        "School of Physical Sciences",
        &[
            ("B.Sc. (Honours) in Chemistry", 3),
            ("B.Sc. (Honours) in Physics", 3),
            ("M.Sc. Chemistry", 2),
            ("Integrated MSc Data Science", 5),
            ("Ph.D. in Chemistry", 0),
        ],
    ),
    (
        "School of Social & Behavioral Sciences",
        &[
            ("Bachelor of Social Work Honours with Research", 4),
            ("MSW (Master of Social Work)", 2),
            ("Ph.D. in Social Work", 0),
            ("Post Graduate Diploma in Counselling Psychology", 1),
        ],
    ),
];

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    #[default]
    Student,
    Faculty,
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserType::Student => write!(f, "Student"),
            UserType::Faculty => write!(f, "Faculty"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SignupField {
    FullName,
    Email,
    Password,
    ConfirmPassword,
    Phone,
    School,
    Degree,
    Course,
    RollNo,
    Sex,
    CurrentYear,
    Position,
}

impl SignupField {
    pub fn label(&self) -> &'static str {
        match self {
            SignupField::FullName => "Full Name",
            SignupField::Email => "Email",
            SignupField::Password => "Password",
            SignupField::ConfirmPassword => "Confirm Password",
            SignupField::Phone => "Phone",
            SignupField::School => "School",
            SignupField::Degree => "Degree",
            SignupField::Course => "Course",
            SignupField::RollNo => "Roll Number",
            SignupField::Sex => "Sex",
            SignupField::CurrentYear => "Current Year",
            SignupField::Position => "Position",
        }
    }

    /// Fields shown for a user type, in display order
    pub fn for_user_type(user_type: UserType) -> &'static [SignupField] {
        use SignupField::*;
        match user_type {
            UserType::Student => &[
                FullName, Email, Password, ConfirmPassword, Phone, RollNo, School, Degree, Course, Sex, CurrentYear,
            ],
            UserType::Faculty => &[FullName, Email, Password, ConfirmPassword, Phone, School, Position],
        }
    }

    pub fn is_secret(&self) -> bool {
        matches!(self, SignupField::Password | SignupField::ConfirmPassword)
    }

    /// Fields picked from a fixed list rather than typed
    pub fn is_choice(&self) -> bool {
        matches!(
            self,
            SignupField::School | SignupField::Degree | SignupField::Course | SignupField::Sex | SignupField::CurrentYear
        )
    }
}

/// Per-field messages from a failed validation
pub type FieldErrors = BTreeMap<SignupField, String>;

#[derive(Error, Debug)]
pub enum SignupError {
    #[error("Please fix {} field(s)", .0.len())]
    Invalid(FieldErrors),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Body for `user/signup/`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignupPayload {
    pub user_type: UserType,
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
    pub school: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degree: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roll_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sex: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
}

// ============================================================================
// Catalog lookups
// ============================================================================

pub fn school_options() -> Vec<&'static str> {
    ACADEMIC_CATALOG.iter().map(|(school, _)| *school).collect()
}

fn courses_of(school: &str) -> &'static [(&'static str, u8)] {
    ACADEMIC_CATALOG
        .iter()
        .find(|(name, _)| *name == school)
        .map(|(_, courses)| *courses)
        .unwrap_or(&[])
}

/// Degree prefixes: the part of each course name before " in ", de-duplicated
pub fn degree_options(school: &str) -> Vec<&'static str> {
    let mut degrees: Vec<&'static str> = Vec::new();
    for (course, _) in courses_of(school) {
        let degree = course.split(" in ").next().unwrap_or(course);
        if !degrees.contains(&degree) {
            degrees.push(degree);
        }
    }
    degrees
}

pub fn course_options(school: &str, degree: &str) -> Vec<&'static str> {
    if degree.is_empty() {
        return Vec::new();
    }
    courses_of(school)
        .iter()
        .map(|(course, _)| *course)
        .filter(|course| course.starts_with(degree))
        .collect()
}

/// "1st Year", "2nd Year", ... for the course; empty when it has no years
pub fn year_options(school: &str, course: &str) -> Vec<String> {
    let years = courses_of(school)
        .iter()
        .find(|(name, _)| *name == course)
        .map(|(_, years)| *years)
        .unwrap_or(0);
    (1..=years).map(|n| format!("{}{} Year", n, ordinal_suffix(n))).collect()
}

fn ordinal_suffix(n: u8) -> &'static str {
    match n {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    }
}

// ============================================================================
// Form
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct SignupForm {
    user_type: UserType,
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub phone: String,
    pub roll_no: String,
    pub sex: String,
    pub position: String,
    school: String,
    degree: String,
    course: String,
    current_year: String,
}

impl SignupForm {
    pub fn new(user_type: UserType) -> Self {
        Self {
            user_type,
            ..Self::default()
        }
    }

    pub fn user_type(&self) -> UserType {
        self.user_type
    }

    /// Switch between student and faculty; a change resets every field
    pub fn set_user_type(&mut self, user_type: UserType) {
        if self.user_type != user_type {
            *self = Self::new(user_type);
        }
    }

    pub fn school(&self) -> &str {
        &self.school
    }

    pub fn degree(&self) -> &str {
        &self.degree
    }

    pub fn course(&self) -> &str {
        &self.course
    }

    pub fn current_year(&self) -> &str {
        &self.current_year
    }

    pub fn set_school(&mut self, school: impl Into<String>) {
        self.school = school.into();
        self.degree.clear();
        self.course.clear();
        self.current_year.clear();
    }

    pub fn set_degree(&mut self, degree: impl Into<String>) {
        self.degree = degree.into();
        self.course.clear();
        self.current_year.clear();
    }

    pub fn set_course(&mut self, course: impl Into<String>) {
        self.course = course.into();
        self.current_year.clear();
    }

    pub fn set_current_year(&mut self, year: impl Into<String>) {
        self.current_year = year.into();
    }

    /// Current value of a field, for rendering
    pub fn value(&self, field: SignupField) -> &str {
        match field {
            SignupField::FullName => &self.full_name,
            SignupField::Email => &self.email,
            SignupField::Password => &self.password,
            SignupField::ConfirmPassword => &self.confirm_password,
            SignupField::Phone => &self.phone,
            SignupField::School => &self.school,
            SignupField::Degree => &self.degree,
            SignupField::Course => &self.course,
            SignupField::RollNo => &self.roll_no,
            SignupField::Sex => &self.sex,
            SignupField::CurrentYear => &self.current_year,
            SignupField::Position => &self.position,
        }
    }

    /// Mutable access to a free-text field; `None` for choice fields
    pub fn text_mut(&mut self, field: SignupField) -> Option<&mut String> {
        match field {
            SignupField::FullName => Some(&mut self.full_name),
            SignupField::Email => Some(&mut self.email),
            SignupField::Password => Some(&mut self.password),
            SignupField::ConfirmPassword => Some(&mut self.confirm_password),
            SignupField::Phone => Some(&mut self.phone),
            SignupField::RollNo => Some(&mut self.roll_no),
            SignupField::Position => Some(&mut self.position),
            _ => None,
        }
    }

    /// Choices available for a choice field given the current selections
    pub fn options(&self, field: SignupField) -> Vec<String> {
        let owned = |list: Vec<&str>| list.into_iter().map(String::from).collect();
        match field {
            SignupField::School => owned(school_options()),
            SignupField::Degree => owned(degree_options(&self.school)),
            SignupField::Course => owned(course_options(&self.school, &self.degree)),
            SignupField::Sex => owned(SEX_OPTIONS.to_vec()),
            SignupField::CurrentYear => year_options(&self.school, &self.course),
            _ => Vec::new(),
        }
    }

    /// Set a choice field, applying the cascade
    pub fn choose(&mut self, field: SignupField, value: impl Into<String>) {
        match field {
            SignupField::School => self.set_school(value),
            SignupField::Degree => self.set_degree(value),
            SignupField::Course => self.set_course(value),
            SignupField::CurrentYear => self.set_current_year(value),
            SignupField::Sex => self.sex = value.into(),
            _ => {}
        }
    }

    pub fn validate(&self, email_domain: &str) -> Result<SignupPayload, FieldErrors> {
        let mut errors = FieldErrors::new();
        let mut fail = |field, message: &str| {
            errors.entry(field).or_insert_with(|| message.to_string());
        };

        if self.full_name.trim().is_empty() {
            fail(SignupField::FullName, "Full name is required.");
        }

        let email = self.email.trim();
        if email.is_empty() {
            fail(SignupField::Email, "Email is required.");
        } else if check_email_domain(email, email_domain).is_err() {
            fail(
                SignupField::Email,
                &format!("Email must be a valid {} address (e.g., user@cb.{})", email_domain, email_domain),
            );
        }

        if self.password.is_empty() {
            fail(SignupField::Password, "Password is required.");
        } else if self.password.chars().count() < MIN_PASSWORD_LEN {
            fail(SignupField::Password, "Password must be at least 8 characters.");
        }
        if self.confirm_password.is_empty() {
            fail(SignupField::ConfirmPassword, "Please confirm your password.");
        } else if self.password != self.confirm_password {
            fail(SignupField::ConfirmPassword, "Passwords do not match.");
        }

        let phone = digits_only(&self.phone);
        if phone.is_empty() {
            fail(SignupField::Phone, "Phone number is required.");
        } else if phone.len() != PHONE_DIGITS {
            fail(SignupField::Phone, "Please enter a valid 10-digit phone number.");
        }

        if self.school.is_empty() {
            fail(SignupField::School, "School is required.");
        }
        match self.user_type {
            UserType::Student => {
                if self.degree.is_empty() {
                    fail(SignupField::Degree, "Degree is required.");
                }
                if self.course.is_empty() {
                    fail(SignupField::Course, "Course is required.");
                }
                if self.roll_no.trim().is_empty() {
                    fail(SignupField::RollNo, "Roll number is required.");
                }
                if self.sex.is_empty() {
                    fail(SignupField::Sex, "Sex is required.");
                }
                if !year_options(&self.school, &self.course).is_empty() && self.current_year.is_empty() {
                    fail(SignupField::CurrentYear, "Current year is required.");
                }
            }
            UserType::Faculty => {
                if self.position.trim().is_empty() {
                    fail(SignupField::Position, "Position is required.");
                }
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        let optional = |value: &str| Some(value.trim().to_string()).filter(|v| !v.is_empty());
        let student = self.user_type == UserType::Student;
        Ok(SignupPayload {
            user_type: self.user_type,
            full_name: self.full_name.trim().to_string(),
            email: email.to_lowercase(),
            password: self.password.clone(),
            phone,
            school: self.school.clone(),
            degree: optional(&self.degree).filter(|_| student),
            course: optional(&self.course).filter(|_| student),
            roll_no: optional(&self.roll_no).filter(|_| student),
            sex: optional(&self.sex).filter(|_| student),
            current_year: optional(&self.current_year).filter(|_| student),
            position: optional(&self.position).filter(|_| !student),
        })
    }

    /// Validate and create the account; the form is cleared on success
    pub async fn submit(&mut self, api: &ApiClient, email_domain: &str) -> Result<Value, SignupError> {
        let payload = self.validate(email_domain).map_err(SignupError::Invalid)?;
        match api.signup(&payload).await {
            Ok(body) => {
                info!(email = %payload.email, user_type = %payload.user_type, "Account created");
                *self = Self::new(self.user_type);
                Ok(body)
            }
            Err(e) => {
                warn!(error = %e, "Signup failed");
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_student() -> SignupForm {
        let mut form = SignupForm::new(UserType::Student);
        form.full_name = "Jane Doe".to_string();
        form.email = "jane@cb.amrita.edu".to_string();
        form.password = "hunter2hunter2".to_string();
        form.confirm_password = "hunter2hunter2".to_string();
        form.phone = "98765 43210".to_string();
        form.roll_no = "CB.EN.U4CSE21001".to_string();
        form.sex = "Female".to_string();
        form.set_school("School of Computing");
        form.set_degree("B. Tech.");
        form.set_course("B. Tech. in Computer Science and Engineering (CSE)");
        form.set_current_year("3rd Year");
        form
    }

    #[test]
    fn test_degree_and_course_options() {
        assert_eq!(degree_options("School of Computing"), vec!["B. Tech.", "M. Tech."]);
        assert_eq!(course_options("School of Computing", "M. Tech.").len(), 4);
        assert!(course_options("School of Computing", "").is_empty());
        assert!(degree_options("Nowhere").is_empty());
        assert_eq!(degree_options("School of Business"), vec!["MBA"]);
    }

    #[test]
    fn test_year_options() {
        assert_eq!(
            year_options("School of Physical Sciences", "B.Sc. (Honours) in Physics"),
            vec!["1st Year", "2nd Year", "3rd Year"]
        );
        assert_eq!(year_options("School of Business", "MBA").len(), 2);
        assert!(year_options("School of Physical Sciences", "Ph.D. in Chemistry").is_empty());
    }

    #[test]
    fn test_cascading_resets() {
        let mut form = valid_student();
        form.set_course("B. Tech. in Computer Science and Engineering (Cyber Security)");
        assert_eq!(form.current_year(), "");
        assert_eq!(form.degree(), "B. Tech.");

        form.set_current_year("1st Year");
        form.set_degree("M. Tech.");
        assert_eq!(form.course(), "");
        assert_eq!(form.current_year(), "");

        form.set_course("M. Tech. in Data Science");
        form.set_school("School of Engineering");
        assert_eq!(form.degree(), "");
        assert_eq!(form.course(), "");
        assert_eq!(form.full_name, "Jane Doe", "unrelated fields survive");
    }

    #[test]
    fn test_switching_user_type_resets() {
        let mut form = valid_student();
        form.set_user_type(UserType::Student);
        assert_eq!(form.full_name, "Jane Doe");

        form.set_user_type(UserType::Faculty);
        assert_eq!(form.user_type(), UserType::Faculty);
        assert_eq!(form.full_name, "");
        assert_eq!(form.school(), "");
    }

    #[test]
    fn test_valid_student_payload() {
        let payload = valid_student().validate("amrita.edu").unwrap();
        assert_eq!(payload.phone, "9876543210");
        assert_eq!(payload.current_year.as_deref(), Some("3rd Year"));
        assert_eq!(payload.position, None);

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["user_type"], "student");
        assert!(json.get("position").is_none());
    }

    #[test]
    fn test_validation_rules() {
        let mut form = valid_student();
        form.email = "jane@gmail.com".to_string();
        form.password = "short".to_string();
        form.confirm_password = "different".to_string();
        form.phone = "12345".to_string();

        let errors = form.validate("amrita.edu").unwrap_err();
        assert!(errors[&SignupField::Email].contains("amrita.edu"));
        assert_eq!(errors[&SignupField::Password], "Password must be at least 8 characters.");
        assert_eq!(errors[&SignupField::ConfirmPassword], "Passwords do not match.");
        assert_eq!(errors[&SignupField::Phone], "Please enter a valid 10-digit phone number.");
        assert!(!errors.contains_key(&SignupField::FullName));
    }

    #[test]
    fn test_year_required_only_when_course_has_years() {
        let mut form = valid_student();
        form.set_current_year("");
        let errors = form.validate("amrita.edu").unwrap_err();
        assert_eq!(errors.keys().copied().collect::<Vec<_>>(), vec![SignupField::CurrentYear]);

        form.set_school("School of Physical Sciences");
        form.set_degree("Ph.D.");
        form.set_course("Ph.D. in Chemistry");
        assert!(form.validate("amrita.edu").is_ok());
    }

    #[test]
    fn test_faculty_requirements() {
        let mut form = SignupForm::new(UserType::Faculty);
        form.full_name = "Dr. Rao".to_string();
        form.email = "rao@amrita.edu".to_string();
        form.password = "correct horse".to_string();
        form.confirm_password = "correct horse".to_string();
        form.phone = "9876543210".to_string();

        let errors = form.validate("amrita.edu").unwrap_err();
        assert_eq!(
            errors.keys().copied().collect::<Vec<_>>(),
            vec![SignupField::School, SignupField::Position]
        );

        form.set_school("School of Engineering");
        form.position = "Professor".to_string();
        let payload = form.validate("amrita.edu").unwrap();
        assert_eq!(payload.position.as_deref(), Some("Professor"));
        assert_eq!(payload.roll_no, None);
    }

    #[test]
    fn test_empty_form_reports_required() {
        let errors = SignupForm::default().validate("amrita.edu").unwrap_err();
        assert_eq!(errors[&SignupField::FullName], "Full name is required.");
        assert_eq!(errors[&SignupField::Email], "Email is required.");
        assert_eq!(errors[&SignupField::Phone], "Phone number is required.");
        assert!(errors.contains_key(&SignupField::Sex));
    }

    #[test]
    fn test_text_mut_only_for_free_text() {
        let mut form = SignupForm::default();
        assert!(form.text_mut(SignupField::School).is_none());
        form.text_mut(SignupField::RollNo).unwrap().push_str("42");
        assert_eq!(form.value(SignupField::RollNo), "42");
    }
}
