use crate::convert::{FromDbModel, FromModel, string_list};
use edulearn_entity::course::category::Model as CategoryModel;
use edulearn_entity::course::course::{Level as LevelModel, Model as CourseModel};
use edulearn_entity::course::enrollment::{Model as EnrollmentModel, Status as EnrollmentStatusModel};
use edulearn_entity::course::lesson::Model as LessonModel;
use edulearn_entity::course::lesson_progress::{Model as ProgressModel, Status as ProgressStatusModel};
use edulearn_entity::user::Model as UserModel;
use edulearn_model::course::{
    Category, CourseDetail, CourseListItem, Enrollment, EnrollmentStatus, Lesson, LessonProgress, Level,
    ProgressStatus,
};
use edulearn_model::quiz::Quiz;

impl FromDbModel<LevelModel> for Level {
    fn from_db_model(model: LevelModel) -> Self {
        match model {
            LevelModel::Beginner => Self::Beginner,
            LevelModel::Intermediate => Self::Intermediate,
            LevelModel::Advanced => Self::Advanced,
        }
    }
}

impl FromModel<Level> for LevelModel {
    fn from_model(model: Level) -> Self {
        match model {
            Level::Beginner => Self::Beginner,
            Level::Intermediate => Self::Intermediate,
            Level::Advanced => Self::Advanced,
        }
    }
}

impl FromDbModel<EnrollmentStatusModel> for EnrollmentStatus {
    fn from_db_model(model: EnrollmentStatusModel) -> Self {
        match model {
            EnrollmentStatusModel::Active => Self::Active,
            EnrollmentStatusModel::Completed => Self::Completed,
            EnrollmentStatusModel::Dropped => Self::Dropped,
        }
    }
}

impl FromModel<EnrollmentStatus> for EnrollmentStatusModel {
    fn from_model(model: EnrollmentStatus) -> Self {
        match model {
            EnrollmentStatus::Active => Self::Active,
            EnrollmentStatus::Completed => Self::Completed,
            EnrollmentStatus::Dropped => Self::Dropped,
        }
    }
}

impl FromDbModel<ProgressStatusModel> for ProgressStatus {
    fn from_db_model(model: ProgressStatusModel) -> Self {
        match model {
            ProgressStatusModel::NotStarted => Self::NotStarted,
            ProgressStatusModel::InProgress => Self::InProgress,
            ProgressStatusModel::Completed => Self::Completed,
        }
    }
}

impl FromModel<ProgressStatus> for ProgressStatusModel {
    fn from_model(model: ProgressStatus) -> Self {
        match model {
            ProgressStatus::NotStarted => Self::NotStarted,
            ProgressStatus::InProgress => Self::InProgress,
            ProgressStatus::Completed => Self::Completed,
        }
    }
}

impl FromDbModel<CategoryModel> for Category {
    fn from_db_model(model: CategoryModel) -> Self {
        Self {
            id: model.id,
            name: model.name,
            slug: model.slug,
            description: model.description,
            parent: model.parent_id,
            icon: model.icon,
        }
    }
}

/// A listed course with the names resolved from its relations.
pub struct CourseListing {
    pub course: CourseModel,
    pub lesson_count: u64,
    pub instructor_name: String,
    pub category_name: Option<String>,
}

impl FromDbModel<CourseListing> for CourseListItem {
    fn from_db_model(model: CourseListing) -> Self {
        let course = model.course;
        Self {
            id: course.id,
            title: course.title,
            slug: course.slug,
            short_description: course.short_description,
            thumbnail: course.thumbnail,
            level: Level::from_db_model(course.level),
            duration: course.duration,
            instructor_name: model.instructor_name,
            category_name: model.category_name,
            lesson_count: model.lesson_count,
            is_featured: course.is_featured,
            is_published: course.is_published,
        }
    }
}

pub struct CourseDetailSource {
    pub course: CourseModel,
    pub category: Option<CategoryModel>,
    pub instructor: UserModel,
    pub lessons: Vec<Lesson>,
    pub enrollment_count: u64,
    pub is_enrolled: bool,
}

impl FromDbModel<CourseDetailSource> for CourseDetail {
    fn from_db_model(model: CourseDetailSource) -> Self {
        let course = model.course;
        Self {
            id: course.id,
            learning_objectives: string_list(&course.learning_objectives),
            title: course.title,
            slug: course.slug,
            description: course.description,
            short_description: course.short_description,
            category: model.category.map(Category::from_db_model),
            instructor: model.instructor.id,
            instructor_name: model.instructor.full_name(),
            level: Level::from_db_model(course.level),
            duration: course.duration,
            prerequisites: course.prerequisites,
            thumbnail: course.thumbnail,
            preview_video: course.preview_video,
            is_published: course.is_published,
            is_featured: course.is_featured,
            lessons: model.lessons,
            enrollment_count: model.enrollment_count,
            is_enrolled: model.is_enrolled,
            created_at: course.created_at,
            updated_at: course.updated_at,
        }
    }
}

impl FromDbModel<LessonModel> for Lesson {
    fn from_db_model(model: LessonModel) -> Self {
        Self::from_db_model((model, vec![]))
    }
}

impl FromDbModel<(LessonModel, Vec<Quiz>)> for Lesson {
    fn from_db_model((model, quizzes): (LessonModel, Vec<Quiz>)) -> Self {
        Self {
            id: model.id,
            title: model.title,
            slug: model.slug,
            description: model.description,
            order: model.position,
            content: model.content,
            video_url: model.video_url,
            duration: model.duration,
            is_published: model.is_published,
            is_free_preview: model.is_free_preview,
            quizzes,
        }
    }
}

impl FromDbModel<(EnrollmentModel, CourseModel)> for Enrollment {
    fn from_db_model((model, course): (EnrollmentModel, CourseModel)) -> Self {
        Self {
            id: model.id,
            course: course.id,
            course_title: course.title,
            status: EnrollmentStatus::from_db_model(model.status),
            progress: model.progress,
            enrolled_at: model.enrolled_at,
            completed_at: model.completed_at,
        }
    }
}

impl FromDbModel<(ProgressModel, LessonModel)> for LessonProgress {
    fn from_db_model((model, lesson): (ProgressModel, LessonModel)) -> Self {
        Self {
            id: model.id,
            lesson: lesson.id,
            lesson_title: lesson.title,
            status: ProgressStatus::from_db_model(model.status),
            time_spent: model.time_spent,
            started_at: model.started_at,
            completed_at: model.completed_at,
            last_accessed_at: model.last_accessed_at,
        }
    }
}
