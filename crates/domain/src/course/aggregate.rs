//! Course aggregate implementation.

use std::collections::BTreeMap;

use common::{CourseId, LecturerId, StudentId};
use record_store::{CourseRecord, Lecturer, Record, Student};

use super::{CourseDto, CourseError};
use crate::lecturer::LecturerDto;
use crate::student::StudentDto;

/// Course aggregate root.
///
/// Holds the resolved leading lecturer and the enrolled students. Membership
/// only changes through [`Course::add_student`] and [`Course::remove_student`];
/// callers get a read-only [`Members`] view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    /// Store-assigned identity, `None` until persisted.
    id: Option<CourseId>,

    name: String,

    /// Identity of `leading_lecturer`, captured at construction.
    leading_lecturer_id: LecturerId,

    leading_lecturer: Lecturer,

    /// Enrolled students keyed by identity.
    students: BTreeMap<StudentId, Student>,

    /// Set by the first successful enrollment on this instance.
    has_enrolled: bool,
}

impl Course {
    /// Creates an unsaved course led by a persisted lecturer.
    pub fn new(name: impl Into<String>, leading_lecturer: Lecturer) -> Result<Self, CourseError> {
        let leading_lecturer_id = leading_lecturer.id().ok_or(CourseError::Transient {
            kind: Lecturer::KIND,
        })?;

        Ok(Self {
            id: None,
            name: name.into(),
            leading_lecturer_id,
            leading_lecturer,
            students: BTreeMap::new(),
            has_enrolled: false,
        })
    }

    /// Returns the same course carrying the given identity.
    pub fn with_id(mut self, id: CourseId) -> Self {
        self.id = Some(id);
        self
    }
}

// Query methods
impl Course {
    /// Returns the course ID.
    pub fn id(&self) -> Option<CourseId> {
        self.id
    }

    /// Returns the course name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the leading lecturer.
    pub fn leading_lecturer(&self) -> &Lecturer {
        &self.leading_lecturer
    }

    /// Returns the leading lecturer's ID.
    pub fn leading_lecturer_id(&self) -> LecturerId {
        self.leading_lecturer_id
    }

    /// Returns a read-only view of the enrolled students.
    pub fn students(&self) -> Members<'_> {
        Members {
            students: &self.students,
        }
    }
}

// Membership methods
impl Course {
    /// Enrolls a persisted student.
    ///
    /// Fails with [`CourseError::DuplicateMember`] if the student is already
    /// enrolled. The membership is left untouched on failure.
    pub fn add_student(&mut self, student: Student) -> Result<&mut Self, CourseError> {
        let student_id = student.id().ok_or(CourseError::Transient {
            kind: Student::KIND,
        })?;

        if self.students.contains_key(&student_id) {
            return Err(CourseError::DuplicateMember {
                student_id,
                course_name: self.name.clone(),
            });
        }

        self.students.insert(student_id, student);
        self.has_enrolled = true;
        Ok(self)
    }

    /// Removes an enrolled student and returns it.
    ///
    /// Fails with [`CourseError::NoMembers`] if no student was ever enrolled
    /// on this instance, otherwise with [`CourseError::MemberNotFound`] for a
    /// non-member.
    pub fn remove_student(&mut self, student_id: StudentId) -> Result<Student, CourseError> {
        if !self.has_enrolled {
            return Err(CourseError::NoMembers {
                course_name: self.name.clone(),
            });
        }

        self.students
            .remove(&student_id)
            .ok_or_else(|| CourseError::MemberNotFound {
                student_id,
                course_name: self.name.clone(),
            })
    }
}

// Conversions
impl Course {
    /// Builds the fully expanded view with nested lecturer and students.
    pub fn to_projection(&self) -> CourseDto {
        CourseDto {
            id: self.id,
            course_name: self.name.clone(),
            leading_lecturer_dto: LecturerDto::from(&self.leading_lecturer),
            student_dtos: self.students.values().map(StudentDto::from).collect(),
        }
    }

    /// Builds the persisted form, holding only foreign keys.
    pub fn to_record(&self) -> CourseRecord {
        let record = CourseRecord::new(
            self.name.clone(),
            self.leading_lecturer_id,
            self.students.keys().copied(),
        );
        match self.id {
            Some(id) => record.with_id(id),
            None => record,
        }
    }
}

/// Read-only view over a course's enrolled students, ordered by identity.
#[derive(Debug, Clone, Copy)]
pub struct Members<'a> {
    students: &'a BTreeMap<StudentId, Student>,
}

impl<'a> Members<'a> {
    /// Returns the number of enrolled students.
    pub fn len(&self) -> usize {
        self.students.len()
    }

    /// Returns true if nobody is enrolled.
    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }

    /// Returns true if the student is enrolled.
    pub fn contains(&self, student_id: StudentId) -> bool {
        self.students.contains_key(&student_id)
    }

    /// Returns an enrolled student by ID.
    pub fn get(&self, student_id: StudentId) -> Option<&'a Student> {
        self.students.get(&student_id)
    }

    /// Iterates over the enrolled students.
    pub fn iter(self) -> impl Iterator<Item = &'a Student> + 'a {
        self.students.values()
    }

    /// Iterates over the enrolled student IDs.
    pub fn ids(self) -> impl Iterator<Item = StudentId> + 'a {
        self.students.keys().copied()
    }
}
