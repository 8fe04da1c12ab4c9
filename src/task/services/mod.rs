//! Orchestration services for the task context.

mod assignment;
mod workflow;

pub use assignment::{
    AssignTasksRequest, TaskAssignmentError, TaskAssignmentResult, TaskAssignmentService,
    UnassignTasksRequest,
};
pub use workflow::{
    BulkChangeStatusRequest, ChangeTaskStatusRequest, CreateTasksFromItemsRequest,
    CreateTasksFromTimeSlicesRequest, DEFAULT_PAGE_SIZE, DeleteTasksRequest, ExportTasksRequest,
    ListTasksRequest, MAX_PAGE_SIZE, TaskWorkflowError, TaskWorkflowResult, TaskWorkflowService,
};
